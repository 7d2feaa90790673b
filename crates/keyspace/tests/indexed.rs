use keyspace::{ErrorClass, prelude::*};
use serde::{Deserialize, Serialize};

///
/// Account
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
struct Account {
    owner: String,
    region: String,
    balance: u64,
}

fn account(owner: &str, region: &str) -> Account {
    Account {
        owner: owner.to_string(),
        region: region.to_string(),
        balance: 0,
    }
}

///
/// AccountIndexes
///

struct AccountIndexes {
    owner: Unique<String, u64, Account>,
    region: Multi<String, u64, Account>,
}

impl<S: KvStore> Indexes<S, u64, Account> for AccountIndexes {
    fn index_list(&self) -> Vec<&dyn Index<S, u64, Account>> {
        let owner: &dyn Index<S, u64, Account> = &self.owner;

        vec![owner, &self.region]
    }
}

struct Ledger {
    ids: Sequence,
    accounts: IndexedMap<u64, Cbor<Account>, AccountIndexes>,
    schema: Schema,
}

fn ledger() -> Ledger {
    let mut builder = SchemaBuilder::new(Config::default());
    let ids = Sequence::new(&mut builder, 0x01u8, "account_ids");
    let indexes = AccountIndexes {
        owner: Unique::new(&mut builder, 0x03u8, "accounts_by_owner", |_, a: &Account| {
            Ok(a.owner.clone())
        }),
        region: Multi::new(&mut builder, 0x04u8, "accounts_by_region", |_, a: &Account| {
            Ok(a.region.clone())
        }),
    };
    let accounts = IndexedMap::new(&mut builder, 0x02u8, "accounts", Cbor::new(), indexes);
    let schema = builder.build().expect("ledger schema");

    Ledger {
        ids,
        accounts,
        schema,
    }
}

fn open(ledger: &Ledger, store: &mut MemoryStore, owner: &str, region: &str) -> u64 {
    let id = ledger.ids.next(store).expect("next id");
    ledger
        .accounts
        .set(store, &id, &account(owner, region))
        .expect("open account");

    id
}

fn in_region(ledger: &Ledger, store: &MemoryStore, region: &str) -> Vec<u64> {
    ledger
        .accounts
        .indexes()
        .region
        .match_exact(store, region.to_string())
        .expect("match")
        .collect::<Result<_, _>>()
        .expect("decode")
}

#[test]
fn accounts_are_found_through_both_indexes() {
    let ledger = ledger();
    let mut store = MemoryStore::new();

    let ada = open(&ledger, &mut store, "ada", "eu");
    let bob = open(&ledger, &mut store, "bob", "us");
    let cy = open(&ledger, &mut store, "cy", "eu");

    assert_eq!((ada, bob, cy), (0, 1, 2));
    assert_eq!(in_region(&ledger, &store, "eu"), vec![ada, cy]);
    assert_eq!(
        ledger
            .accounts
            .indexes()
            .owner
            .match_exact(&store, &"bob".to_string())
            .expect("bob"),
        bob
    );
}

#[test]
fn taken_owner_is_refused_without_side_effects() {
    let ledger = ledger();
    let mut store = MemoryStore::new();
    open(&ledger, &mut store, "ada", "eu");
    let before = store.clone();

    let err = ledger
        .accounts
        .set(&mut store, &7, &account("ada", "us"))
        .expect_err("owner already taken");

    assert_eq!(err.class, ErrorClass::Conflict);
    assert_eq!(store, before);
    assert!(in_region(&ledger, &store, "us").is_empty());
}

#[test]
fn moving_and_closing_accounts_updates_indexes() {
    let ledger = ledger();
    let mut store = MemoryStore::new();
    let ada = open(&ledger, &mut store, "ada", "eu");

    ledger
        .accounts
        .set(&mut store, &ada, &account("ada", "us"))
        .expect("move region");
    assert!(in_region(&ledger, &store, "eu").is_empty());
    assert_eq!(in_region(&ledger, &store, "us"), vec![ada]);

    ledger.accounts.remove(&mut store, &ada).expect("close");
    assert!(in_region(&ledger, &store, "us").is_empty());

    // only the id sequence remains
    let remaining: Vec<&str> = store
        .keys()
        .filter_map(|key| ledger.schema.collection_for_key(key))
        .map(|info| info.name.as_str())
        .collect();
    assert_eq!(remaining, vec!["account_ids"]);
}

#[test]
fn tree_map_answers_neighbour_queries_over_the_same_store() {
    let mut builder = SchemaBuilder::new(Config::default());
    let tree: TreeMap<u32, Json<String>> =
        TreeMap::new(&mut builder, 0x20u8, "levels", Json::new());
    let mut store = MemoryStore::new();

    for level in [40u32, 10, 30, 20, 50] {
        tree.set(&mut store, &level, &format!("level {level}"))
            .expect("insert");
    }

    assert_eq!(tree.floor(&store, &35).expect("floor"), Some(30));
    assert_eq!(tree.ceil(&store, &35).expect("ceil"), Some(40));
    assert_eq!(tree.get(&store, &20).expect("get"), "level 20");
    tree.check_invariants(&store).expect("balanced");
}

#[test]
fn vector_reports_bounds_and_emptiness() {
    let mut builder = SchemaBuilder::new(Config::default());
    let log: Vector<Json<String>> = Vector::new(&mut builder, 0x30u8, "log", Json::new());
    let mut store = MemoryStore::new();

    assert_eq!(
        log.pop(&mut store).expect_err("empty").class,
        ErrorClass::EmptyVec
    );
    log.push(&mut store, &"first".to_string()).expect("push");

    assert_eq!(
        log.get(&store, 1).expect_err("past the end").class,
        ErrorClass::OutOfBounds
    );
    assert_eq!(log.pop(&mut store).expect("pop"), "first");
    assert!(log.is_empty(&store).expect("is_empty"));
}
