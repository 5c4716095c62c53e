//! Plain 2D storage shared by the spectral helpers.
//!
//! `Grid` keeps samples row-major (`y * width + x`), the same layout the row
//! FFT pass walks with `chunks_exact_mut(width)`. `Channels` holds one value
//! per RGB channel.

use std::ops::{Index, IndexMut};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("invalid grid buffer length: expected {expected}, got {actual}")]
    BufferLength { expected: usize, actual: usize },
    #[error("grid size overflow: {width}x{height}")]
    SizeOverflow { width: usize, height: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    pub fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }
}

/// One value per color channel, in R, G, B order.
#[derive(Clone, Debug, PartialEq)]
pub struct Channels<T>([T; 3]);

impl<T> Channels<T> {
    pub fn new(red: T, green: T, blue: T) -> Self {
        Self([red, green, blue])
    }

    pub fn from_fn(f: impl FnMut(Channel) -> T) -> Self {
        Self(Channel::ALL.map(f))
    }

    pub fn get(&self, channel: Channel) -> &T {
        &self.0[channel.index()]
    }

    pub fn get_mut(&mut self, channel: Channel) -> &mut T {
        &mut self.0[channel.index()]
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.0.iter()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Channels<U> {
        Channels(self.0.map(f))
    }

    pub fn each_ref(&self) -> Channels<&T> {
        Channels(self.0.each_ref())
    }

    pub fn try_map<U, E>(self, mut f: impl FnMut(T) -> Result<U, E>) -> Result<Channels<U>, E> {
        let [red, green, blue] = self.0;
        Ok(Channels([f(red)?, f(green)?, f(blue)?]))
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.0
    }

    pub fn into_array(self) -> [T; 3] {
        self.0
    }
}

impl<T> Index<Channel> for Channels<T> {
    type Output = T;

    fn index(&self, channel: Channel) -> &T {
        self.get(channel)
    }
}

impl<T> IndexMut<Channel> for Channels<T> {
    fn index_mut(&mut self, channel: Channel) -> &mut T {
        self.get_mut(channel)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T: Clone> Grid<T> {
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }
}

impl<T> Grid<T> {
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self, GridError> {
        let expected = width
            .checked_mul(height)
            .ok_or(GridError::SizeOverflow { width, height })?;
        if data.len() != expected {
            return Err(GridError::BufferLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Builds a grid by evaluating `f(x, y)` for every cell.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl<T> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    fn index(&self, (x, y): (usize, usize)) -> &T {
        assert!(x < self.width && y < self.height, "grid index out of range");
        &self.data[y * self.width + x]
    }
}

impl<T> IndexMut<(usize, usize)> for Grid<T> {
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut T {
        assert!(x < self.width && y < self.height, "grid index out of range");
        &mut self.data[y * self.width + x]
    }
}
