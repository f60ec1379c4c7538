//! Checks share tables across threads without coordination.

mod common;

use std::thread;
use tabular_guard::prelude::*;

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn engine_types_are_send_and_sync() {
    assert_send_sync::<Table>();
    assert_send_sync::<DiscrepancyReport>();
    assert_send_sync::<CompletenessCheck>();
    assert_send_sync::<UniquenessCheck>();
    assert_send_sync::<ReferentialIntegrityCheck>();
    assert_send_sync::<ReconciliationCheck>();
    assert_send_sync::<AggregateSide<'static>>();
    assert_send_sync::<Catalog>();
    assert_send_sync::<ValidationSuite>();
}

#[test]
fn parallel_checks_match_sequential_results() {
    let customers = common::customers();
    let transactions = common::transactions();
    let clean = common::transactions_clean();
    let key = vec!["customer_id".to_string()];

    let completeness = || CompletenessCheck::new(["name", "email", "country"]).check(&customers);
    let uniqueness = || UniquenessCheck::new(["name"]).check(&customers);
    let referential = || {
        ReferentialIntegrityCheck::new(["customer_id"], ["customer_id"]).check(&transactions, &customers)
    };
    let reconciliation = || {
        ReconciliationCheck::new("country", "amount").check(
            AggregateSide::with_lookup(&transactions, Lookup::new(&customers, &key, &key)),
            AggregateSide::native(&clean),
        )
    };

    let sequential = vec![
        completeness().unwrap(),
        uniqueness().unwrap(),
        referential().unwrap(),
        reconciliation().unwrap(),
    ];

    for _ in 0..4 {
        let parallel = thread::scope(|s| {
            let handles = vec![
                s.spawn(completeness),
                s.spawn(uniqueness),
                s.spawn(referential),
                s.spawn(reconciliation),
            ];
            handles
                .into_iter()
                .map(|h| h.join().unwrap().unwrap())
                .collect::<Vec<_>>()
        });
        assert_eq!(parallel, sequential);
    }
}

#[test]
fn one_suite_runs_on_many_threads() {
    let catalog = common::catalog();
    let suite = ValidationSuite::builder("shared")
        .check(SuiteCheck::new("emails", Rule::completeness("customers", ["email"])))
        .check(SuiteCheck::new(
            "fk",
            Rule::referential_integrity("transactions", ["customer_id"], "customers", ["customer_id"]),
        ))
        .build();

    let totals: Vec<usize> = thread::scope(|s| {
        (0..8)
            .map(|_| s.spawn(|| suite.run(&catalog).unwrap().metrics.total_violations))
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect()
    });
    assert!(totals.iter().all(|&t| t == 2));
}
