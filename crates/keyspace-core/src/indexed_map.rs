//! Module: indexed_map
//! Responsibility: a primary `Map` whose secondary indexes follow every
//! write and delete.
//! Does not own: index storage layouts (see `indexes`).
//! Boundary: callers mutate through `IndexedMap`; writing to the primary
//! map directly bypasses index maintenance.

use crate::{
    codec::{KeyCodec, ValueCodec},
    collections::Map,
    error::{ErrorClass, ErrorOrigin, InternalError},
    indexes::Index,
    range::{Iter, Ranger},
    schema::{Prefix, SchemaBuilder},
    store::KvStore,
};
use std::mem;

type Fetch<'a, S, V> = Box<dyn FnOnce(&S) -> Result<Option<V>, InternalError> + 'a>;

enum LazyState<'a, S, V> {
    Pending(Fetch<'a, S, V>),
    Ready(Option<V>),
    Failed,
}

///
/// LazyValue
///
/// Memoizing thunk for the value currently stored under a primary key.
/// The fetch runs at most once, however many indexes ask for it.
///

pub struct LazyValue<'a, S, V> {
    state: LazyState<'a, S, V>,
}

impl<'a, S, V> LazyValue<'a, S, V> {
    pub fn new(fetch: impl FnOnce(&S) -> Result<Option<V>, InternalError> + 'a) -> Self {
        Self {
            state: LazyState::Pending(Box::new(fetch)),
        }
    }

    /// Thunk whose value is already known.
    #[must_use]
    pub const fn ready(value: Option<V>) -> Self {
        Self {
            state: LazyState::Ready(value),
        }
    }

    /// Fetch on first call, then return the cached value.
    /// A failed fetch is not retried.
    pub fn get(&mut self, store: &S) -> Result<Option<&V>, InternalError> {
        let state = mem::replace(&mut self.state, LazyState::Failed);
        self.state = match state {
            LazyState::Pending(fetch) => LazyState::Ready(fetch(store)?),
            other => other,
        };

        match &self.state {
            LazyState::Ready(value) => Ok(value.as_ref()),
            LazyState::Pending(_) | LazyState::Failed => Err(InternalError::new(
                ErrorClass::Internal,
                ErrorOrigin::Index,
                "previous value fetch already failed",
            )),
        }
    }
}

///
/// Indexes
///
/// The set of indexes attached to an `IndexedMap`, in the order they are
/// updated.
///

pub trait Indexes<S, PK, V> {
    fn index_list(&self) -> Vec<&dyn Index<S, PK, V>>;
}

impl<S, PK, V> Indexes<S, PK, V> for () {
    fn index_list(&self) -> Vec<&dyn Index<S, PK, V>> {
        Vec::new()
    }
}

///
/// IndexedMap
///
/// Primary map plus indexes. `set` references every index before the
/// primary write; `remove` unreferences every index before the primary
/// delete. Each call reads the previous value at most once.
///
/// An index error aborts the call. Indexes updated before the failing one
/// keep their writes; callers that need atomicity run the call inside a
/// store transaction.
///

pub struct IndexedMap<PK, VC, I> {
    primary: Map<PK, VC>,
    indexes: I,
}

impl<PK, VC, I> IndexedMap<PK, VC, I>
where
    PK: KeyCodec,
    VC: ValueCodec,
{
    pub fn new(
        builder: &mut SchemaBuilder,
        prefix: impl Into<Prefix>,
        name: impl Into<String>,
        value_codec: VC,
        indexes: I,
    ) -> Self {
        Self {
            primary: Map::new(builder, prefix, name, value_codec),
            indexes,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.primary.name()
    }

    #[must_use]
    pub const fn primary(&self) -> &Map<PK, VC> {
        &self.primary
    }

    #[must_use]
    pub const fn indexes(&self) -> &I {
        &self.indexes
    }

    pub fn set<S>(&self, store: &mut S, pk: &PK, value: &VC::Value) -> Result<(), InternalError>
    where
        S: KvStore,
        I: Indexes<S, PK, VC::Value>,
    {
        // a value the primary map would refuse must not reach any index
        let entry = self.primary.encode_checked(pk, value)?;

        let mut old = LazyValue::new(|store: &S| self.primary.try_get(store, pk));
        for index in self.indexes.index_list() {
            index.reference(store, pk, value, &mut old)?;
        }

        self.primary.write_encoded(store, &entry)
    }

    /// Delete `pk` and its index references. A missing key is a no-op.
    pub fn remove<S>(&self, store: &mut S, pk: &PK) -> Result<(), InternalError>
    where
        S: KvStore,
        I: Indexes<S, PK, VC::Value>,
    {
        let mut old = LazyValue::new(|store: &S| self.primary.try_get(store, pk));
        if old.get(store)?.is_none() {
            return Ok(());
        }

        for index in self.indexes.index_list() {
            index.unreference(store, pk, &mut old)?;
        }

        self.primary.remove(store, pk)
    }

    pub fn get<S: KvStore>(&self, store: &S, pk: &PK) -> Result<VC::Value, InternalError> {
        self.primary.get(store, pk)
    }

    pub fn try_get<S: KvStore>(
        &self,
        store: &S,
        pk: &PK,
    ) -> Result<Option<VC::Value>, InternalError> {
        self.primary.try_get(store, pk)
    }

    pub fn has<S: KvStore>(&self, store: &S, pk: &PK) -> Result<bool, InternalError> {
        self.primary.has(store, pk)
    }

    pub fn iterate<'a, S: KvStore>(
        &'a self,
        store: &'a S,
        range: impl Ranger<PK>,
    ) -> Result<Iter<'a, PK, VC>, InternalError> {
        self.primary.iterate(store, range)
    }

    pub fn walk<S, E, F>(&self, store: &S, range: impl Ranger<PK>, f: F) -> Result<(), E>
    where
        S: KvStore,
        E: From<InternalError>,
        F: FnMut(PK, VC::Value) -> Result<bool, E>,
    {
        self.primary.walk(store, range, f)
    }
}
