//! Property tests (spec.md §8, P1–P9). P10 (snapshot round-trip) lives in
//! `src/vm/snapshot.rs`'s unit tests, alongside the code it verifies.

use proptest::prelude::*;

use meta_runtime::isr::CONTEXT_CAP;
use meta_runtime::node::fingerprint::fingerprint;
use meta_runtime::node::json::{from_json, to_json};
use meta_runtime::node::normalize::normalize;
use meta_runtime::node::sexpr::{parse_sexpr, to_sexpr};
use meta_runtime::node::{entity, number, relation, struct_, text};
use meta_runtime::plan::{OpLabel, Plan, Route};
use meta_runtime::run_text;
use meta_runtime::session::Session;

fn sample_nodes() -> impl Strategy<Value = meta_runtime::node::NodeRef> {
    let leaf = prop_oneof![
        "[a-z]{1,8}".prop_map(|s| entity(&s).unwrap()),
        any::<i16>().prop_map(|n| number(f64::from(n))),
        "[a-zA-Z ]{0,12}".prop_map(text),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| relation("IS_A", vec![a, b]).unwrap()),
            prop::collection::vec(("[a-z]{1,6}", inner), 0..4).prop_map(|fields| {
                let refs: Vec<(&str, meta_runtime::node::NodeRef)> =
                    fields.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();
                struct_(refs).unwrap()
            }),
        ]
    })
}

proptest! {
    /// P1: fingerprint(normalize(n)) == fingerprint(normalize(normalize(n))).
    #[test]
    fn p1_canonicalization_is_idempotent(n in sample_nodes()) {
        let once = normalize(&n);
        let twice = normalize(&once);
        prop_assert_eq!(fingerprint(&once), fingerprint(&twice));
    }

    /// P2: JSON and S-expr round-trips preserve the normalized node's identity.
    #[test]
    fn p2_serialization_round_trips(n in sample_nodes()) {
        let normalized = normalize(&n);

        let json = to_json(&normalized);
        let from_j = from_json(&json).unwrap();
        prop_assert_eq!(fingerprint(&normalize(&from_j)), fingerprint(&normalized));

        let sexpr = to_sexpr(&normalized);
        let from_s = parse_sexpr(&sexpr).unwrap();
        prop_assert_eq!(fingerprint(&normalize(&from_s)), fingerprint(&normalized));
    }

    /// P3: after normalize, STRUCT field keys are strictly sorted with no duplicates.
    #[test]
    fn p3_struct_fields_are_sorted_after_normalize(n in sample_nodes()) {
        let normalized = normalize(&n);
        if let Some(fields) = normalized.fields() {
            for pair in fields.windows(2) {
                prop_assert!(pair[0].0.as_ref() < pair[1].0.as_ref());
            }
        }
    }

    /// P4: two runs of the same input produce byte-identical meta_digest.
    #[test]
    fn p4_turn_determinism(input in "[a-zA-Z0-9 +?.!]{1,40}") {
        let a = run_text(&input, None);
        let b = run_text(&input, None);
        let digest_of = |summary: &meta_runtime::node::NodeRef| {
            summary
                .fields()
                .unwrap()
                .iter()
                .find(|(k, _)| k.as_ref() == "meta_digest")
                .unwrap()
                .1
                .as_text()
                .unwrap()
                .to_string()
        };
        prop_assert_eq!(digest_of(&a.meta_summary), digest_of(&b.meta_summary));
    }

    /// P5: Plan digest depends only on (ops, description, constants), not on
    /// construction order of an otherwise-identical constants vector.
    #[test]
    fn p5_plan_digest_is_stable_for_identical_constants(v in any::<i16>()) {
        let c1 = number(f64::from(v));
        let c2 = number(f64::from(v));
        let plan1 = Plan::new(Route::Math, "d", vec![OpLabel::Normalize], vec![], vec![c1]);
        let plan2 = Plan::new(Route::Math, "d", vec![OpLabel::Normalize], vec![], vec![c2]);
        prop_assert_eq!(plan1.digest, plan2.digest);
    }

    /// P6: the scheduler halts within the configured step budget.
    #[test]
    fn p6_scheduler_terminates_within_budget(input in "[a-zA-Z0-9 +?.!]{1,40}") {
        let outcome = run_text(&input, None);
        prop_assert!(outcome.trace.steps.len() as u32 <= Session::default().config.scheduler.step_budget);
    }

    /// P7: when the scheduler halts QUEUE_EMPTY or QUALITY_THRESHOLD, the VM
    /// re-execution of the plan agrees with the Φ-loop's answer.
    #[test]
    fn p7_vm_phi_agreement_on_clean_halts(input in "[a-zA-Z0-9 +?.!]{1,40}") {
        let outcome = run_text(&input, None);
        use meta_runtime::scheduler::HaltReason;
        if matches!(outcome.halt_reason, HaltReason::QueueEmpty | HaltReason::QualityThreshold) {
            prop_assert!(outcome.calc_result.consistent);
        }
    }

    /// P8: after at least one NORMALIZE, the context ring buffer stays <= CONTEXT_CAP.
    #[test]
    fn p8_context_cap_holds(input in "[a-zA-Z0-9 +?.!]{1,60}") {
        let outcome = run_text(&input, None);
        prop_assert!(outcome.isr.context.len() <= CONTEXT_CAP);
    }

    /// P9: ISR.quality never decreases across the recorded trace steps.
    #[test]
    fn p9_quality_is_monotonic(input in "[a-zA-Z0-9 +?.!]{1,40}") {
        let outcome = run_text(&input, None);
        let mut running = 0.0_f64;
        for step in &outcome.trace.steps {
            prop_assert!(step.delta_quality >= -1e-9, "quality dropped: {:?}", step);
            running += step.delta_quality;
        }
        let _ = running;
    }
}
