//! Deterministic neuro-symbolic reasoning runtime (spec.md §1): classify
//! text into a route, compile a Φ-plan against the canonical node algebra,
//! run it through the scheduler, and assemble an auditable per-turn record.
//!
//! Dependency order (spec.md §2): [`node`] → [`isr`] → [`router`] →
//! [`phi`] → [`scheduler`] → [`vm`] → [`summary`].

pub mod config;
pub mod error;
pub mod isr;
pub mod lang;
pub mod mathexpr;
pub mod node;
pub mod phi;
pub mod plan;
pub mod router;
pub mod scheduler;
pub mod session;
pub mod summary;
pub mod telemetry;
pub mod vm;

use node::NodeRef;
use scheduler::HaltReason;
use session::Session;
use summary::CalcResult;

/// Outcome of one `run_text` turn (spec.md §6.1).
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub answer: NodeRef,
    pub quality: f64,
    pub halt_reason: HaltReason,
    pub isr: isr::Isr,
    pub trace: isr::Trace,
    pub meta_summary: NodeRef,
    pub calc_result: CalcResult,
}

/// Runs one turn end-to-end: classifies `text`, seeds and schedules the
/// session, then assembles the Meta-Summary. `session` defaults to a fresh
/// one built from `RuntimeConfig::default()` when not supplied.
pub fn run_text(text: &str, session: Option<Session>) -> RunOutcome {
    let mut session = session.unwrap_or_default();
    let trimmed = text.trim().to_string();

    let route_result = router::classify(&trimmed, &session);
    router::seed_session(&mut session, &route_result);
    let halt_reason = scheduler::run(&mut session);

    let calc_result = summary::verify_calc_exec(&session.isr, &route_result.calc_plan, &session.config);
    let meta_summary = summary::build(&trimmed, &route_result, &session.isr, halt_reason, &calc_result);

    RunOutcome {
        answer: session.isr.answer.clone(),
        quality: session.isr.quality,
        halt_reason,
        isr: session.isr,
        trace: session.trace,
        meta_summary,
        calc_result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn math_scenario_s1() {
        let outcome = run_text("2+2", None);
        assert_eq!(outcome.answer.as_text(), Some("2+2 = 4"));
        assert!(outcome.calc_result.consistent);
    }

    #[test]
    fn instinct_scenario_s3() {
        let outcome = run_text("Oi Metanúcleo!", None);
        let text = outcome.answer.as_text().unwrap();
        assert!(text.starts_with("Olá"));
        assert!(text.contains("Metanúcleo"));
        assert!(outcome.quality >= 0.85);
    }

    #[test]
    fn logic_scenario_s4() {
        let outcome = run_text("FACT chuva", None);
        assert!(!outcome.answer.is_nil());
        assert!(outcome.calc_result.consistent);
    }

    #[test]
    fn code_scenario_s5() {
        let outcome = run_text("def soma(x, y):\n    return x + y\n", None);
        let text = outcome.answer.as_text().unwrap();
        assert!(text.contains("python"));
    }

    #[test]
    fn text_scenario_s6() {
        let outcome = run_text("como você está?", None);
        assert!(!outcome.answer.is_nil());
        assert!(outcome.calc_result.consistent);
    }

    #[test]
    fn same_input_twice_yields_identical_meta_digest() {
        let o1 = run_text("2+2", None);
        let o2 = run_text("2+2", None);
        let d1 = o1.meta_summary.fields().unwrap().iter().find(|(k, _)| k.as_ref() == "meta_digest").unwrap().1.clone();
        let d2 = o2.meta_summary.fields().unwrap().iter().find(|(k, _)| k.as_ref() == "meta_digest").unwrap().1.clone();
        assert_eq!(d1.as_text(), d2.as_text());
    }
}
