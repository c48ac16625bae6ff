/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! A type-map of per-request attributes.
//!
//! Middleware use the bag to pass values down the chain without widening the
//! [`HandlerExecutionContext`](crate::context::HandlerExecutionContext) itself.
//! Each type has at most one entry.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasherDefault, Hasher};

type AnyMap = HashMap<TypeId, Box<dyn Any + Send + Sync>, BuildHasherDefault<IdHasher>>;

// TypeIds are already hashes produced by the compiler, so the hasher only folds
// whatever words it is fed.
#[derive(Default)]
struct IdHasher(u64);

impl Hasher for IdHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for b in bytes {
            self.0 = self.0.rotate_left(8) ^ u64::from(*b);
        }
    }

    #[inline]
    fn write_u64(&mut self, id: u64) {
        self.0 ^= id;
    }
}

/// A type-map of request attributes.
#[derive(Default)]
pub struct ConfigBag {
    map: AnyMap,
}

impl fmt::Debug for ConfigBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigBag")
            .field("len", &self.map.len())
            .finish()
    }
}

impl ConfigBag {
    /// Create an empty `ConfigBag`.
    #[inline]
    pub fn new() -> ConfigBag {
        ConfigBag {
            map: AnyMap::default(),
        }
    }

    /// Insert a value, returning the previous value of the same type.
    ///
    /// # Examples
    ///
    /// ```
    /// # use zynamo_runtime::config_bag::ConfigBag;
    /// let mut bag = ConfigBag::new();
    ///
    /// #[derive(Debug, Eq, PartialEq)]
    /// struct TableName(&'static str);
    /// assert!(bag.insert(TableName("users")).is_none());
    /// assert_eq!(bag.insert(TableName("orders")), Some(TableName("users")));
    /// ```
    pub fn insert<T: Send + Sync + 'static>(&mut self, val: T) -> Option<T> {
        self.map
            .insert(TypeId::of::<T>(), Box::new(val))
            .and_then(|boxed| {
                (boxed as Box<dyn Any + 'static>)
                    .downcast()
                    .ok()
                    .map(|boxed| *boxed)
            })
    }

    /// Get a reference to a previously inserted value.
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.map
            .get(&TypeId::of::<T>())
            .and_then(|boxed| (&**boxed as &(dyn Any + 'static)).downcast_ref())
    }

    /// Get a mutable reference to a previously inserted value.
    pub fn get_mut<T: Send + Sync + 'static>(&mut self) -> Option<&mut T> {
        self.map
            .get_mut(&TypeId::of::<T>())
            .and_then(|boxed| (&mut **boxed as &mut (dyn Any + 'static)).downcast_mut())
    }

    /// Remove a value of type `T`, returning it.
    pub fn remove<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.map.remove(&TypeId::of::<T>()).and_then(|boxed| {
            (boxed as Box<dyn Any + 'static>)
                .downcast()
                .ok()
                .map(|boxed| *boxed)
        })
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True if the bag holds nothing.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::ConfigBag;

    #[test]
    fn one_entry_per_type() {
        #[derive(Debug, PartialEq)]
        struct Region(&'static str);
        #[derive(Debug, PartialEq)]
        struct Attempts(u32);

        let mut bag = ConfigBag::new();
        bag.insert(Region("us-east-1"));
        bag.insert(Attempts(1));
        bag.get_mut::<Attempts>().expect("inserted").0 += 1;
        assert_eq!(bag.len(), 2);
        assert_eq!(bag.get::<Region>(), Some(&Region("us-east-1")));
        assert_eq!(bag.remove::<Attempts>(), Some(Attempts(2)));
        assert!(bag.get::<Attempts>().is_none());
        assert!(!bag.is_empty());
    }
}
