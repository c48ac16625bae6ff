/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Boxes that carry inputs and outputs through the pipeline without naming their types.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

/// A [`TypeErasedBox`] known to hold a `T`.
#[derive(Debug)]
pub struct TypedBox<T> {
    inner: TypeErasedBox,
    _phantom: PhantomData<T>,
}

impl<T> TypedBox<T>
where
    T: Send + Sync + 'static,
{
    /// Box `inner`.
    pub fn new(inner: T) -> Self {
        Self {
            inner: TypeErasedBox::new(inner),
            _phantom: Default::default(),
        }
    }

    /// Reclaim the type of an erased box, or give the box back if it holds something else.
    pub fn assume_from(type_erased: TypeErasedBox) -> Result<TypedBox<T>, TypeErasedBox> {
        if type_erased.is::<T>() {
            Ok(TypedBox {
                inner: type_erased,
                _phantom: Default::default(),
            })
        } else {
            Err(type_erased)
        }
    }

    /// Take the value out of the box.
    pub fn into_inner(self) -> T {
        match self.inner.downcast::<T>() {
            Ok(value) => *value,
            Err(_) => unreachable!("type checked on construction"),
        }
    }

    /// Forget the type.
    pub fn erase(self) -> TypeErasedBox {
        self.inner
    }
}

impl<T: 'static> Deref for TypedBox<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.inner.downcast_ref().expect("type checked")
    }
}

impl<T: 'static> DerefMut for TypedBox<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.inner.downcast_mut().expect("type checked")
    }
}

/// A `Send + Sync` box of any `'static` value that remembers its type name.
pub struct TypeErasedBox {
    inner: Box<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl fmt::Debug for TypeErasedBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeErasedBox")
            .field("type_name", &self.type_name)
            .finish()
    }
}

impl TypeErasedBox {
    /// Box `value`, erasing its type.
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self {
            inner: Box::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// The name of the boxed type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// True if the box holds a `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Downcast into a `Box<T>`, or give the box back.
    pub fn downcast<T: 'static>(self) -> Result<Box<T>, Self> {
        let type_name = self.type_name;
        match self.inner.downcast() {
            Ok(t) => Ok(t),
            Err(inner) => Err(Self { inner, type_name }),
        }
    }

    /// Downcast to a reference.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.inner.downcast_ref()
    }

    /// Downcast to a mutable reference.
    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.inner.downcast_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Key(&'static str);
    #[derive(Debug)]
    struct Count(isize);

    #[test]
    fn erase_and_recover() {
        let key = TypedBox::new(Key("pk"));
        let count = TypedBox::new(Count(2));

        let mut key_erased = key.erase();
        assert!(key_erased.type_name().ends_with("Key"));
        key_erased.downcast_mut::<Key>().expect("it's a Key").0 = "sk";

        let count_erased = TypedBox::<Key>::assume_from(count.erase()).expect_err("it's not a Key");
        let mut count = TypedBox::<Count>::assume_from(count_erased).expect("it's a Count");
        count.0 += 1;
        assert_eq!(3, count.into_inner().0);

        assert!(key_erased.downcast_ref::<Count>().is_none());
        let key_erased = key_erased.downcast::<Count>().expect_err("it's not a Count");
        assert!(key_erased.type_name().ends_with("Key"));
        assert_eq!("sk", key_erased.downcast::<Key>().expect("it's a Key").0);
    }
}
