//! `svms/1` snapshot bundle (spec.md §4.9, §6.3): a self-describing JSON
//! document capturing `{ version, digest, program, state }`, optionally
//! Ed25519-signed. Re-encoding a snapshot must yield a byte-identical
//! digest — the digest covers only `version`/`program`/`state`, computed
//! over a deterministic JSON rendering built field-by-field rather than
//! relying on whatever order a generic struct happens to serialize in.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::SnapshotDigestAlgo;
use crate::isr::Isr;
use crate::node::{self, NodeRef};
use crate::vm::opcode::Instruction;
use crate::vm::signing::SignatureBlock;
use crate::vm::{bytecode, VmError};

pub const VERSION: &str = "svms/1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramSection {
    pub bytecode_base64: String,
    pub constants: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSection {
    pub isr: Value,
    pub vm: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: String,
    pub digest: String,
    pub program: ProgramSection,
    pub state: StateSection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<SignatureBlock>,
}

fn isr_to_json(isr: &Isr) -> Value {
    json!({
        "ontology": isr.ontology.iter().map(node::json::to_json).collect::<Vec<_>>(),
        "relations": isr.relations.iter().map(node::json::to_json).collect::<Vec<_>>(),
        "context": isr.context.iter().map(node::json::to_json).collect::<Vec<_>>(),
        "goals": isr.goals.iter().map(node::json::to_json).collect::<Vec<_>>(),
        "answer": node::json::to_json(&isr.answer),
        "quality": isr.quality,
        "scratch": node::json::to_json(&isr.scratch),
        "contradiction_detected": isr.contradiction_detected,
    })
}

fn digest_bytes(algo: SnapshotDigestAlgo, bytes: &[u8]) -> Result<Vec<u8>, VmError> {
    match algo {
        SnapshotDigestAlgo::Blake2b256 => {
            let mut hasher = Blake2b::<U32>::new();
            hasher.update(bytes);
            Ok(hasher.finalize().to_vec())
        }
        SnapshotDigestAlgo::Blake3 => {
            #[cfg(feature = "blake3-digest")]
            {
                Ok(blake3::hash(bytes).as_bytes().to_vec())
            }
            #[cfg(not(feature = "blake3-digest"))]
            {
                Err(VmError::InvalidBytecode(
                    "blake3 snapshot digest requested but the blake3-digest feature is not enabled".to_string(),
                ))
            }
        }
    }
}

fn canonical_payload(version: &str, program: &ProgramSection, state: &StateSection) -> Value {
    json!({ "version": version, "program": program, "state": state })
}

/// Builds a `Snapshot` for `program`/`constants` executed against `isr`,
/// with `vm_meta` carrying whatever small VM configuration (budget,
/// contradiction flag) is worth recording alongside the ISR.
pub fn build_snapshot(
    program: &[Instruction],
    constants: &[NodeRef],
    isr: &Isr,
    vm_meta: Value,
    algo: SnapshotDigestAlgo,
) -> Result<Snapshot, VmError> {
    let bytecode = bytecode::encode(program, 1, 0);
    let program_section = ProgramSection {
        bytecode_base64: {
            use base64::engine::general_purpose::STANDARD as B64;
            use base64::Engine as _;
            B64.encode(bytecode)
        },
        constants: constants.iter().map(node::json::to_json).collect(),
    };
    let state_section = StateSection { isr: isr_to_json(isr), vm: vm_meta };

    let payload = canonical_payload(VERSION, &program_section, &state_section);
    let payload_bytes = serde_json::to_vec(&payload).map_err(|e| VmError::InvalidBytecode(e.to_string()))?;
    let digest = hex::encode(digest_bytes(algo, &payload_bytes)?);

    Ok(Snapshot { version: VERSION.to_string(), digest, program: program_section, state: state_section, signature: None })
}

/// Recomputes the digest over `snapshot`'s `program`/`state` and compares it
/// to the stored `digest` field; if a signature is present, also verifies
/// it against the recomputed digest bytes.
pub fn verify_snapshot(snapshot: &Snapshot, algo: SnapshotDigestAlgo) -> Result<bool, VmError> {
    if snapshot.version != VERSION {
        return Err(VmError::InvalidBytecode(format!("unsupported snapshot version {}", snapshot.version)));
    }
    let payload = canonical_payload(&snapshot.version, &snapshot.program, &snapshot.state);
    let payload_bytes = serde_json::to_vec(&payload).map_err(|e| VmError::InvalidBytecode(e.to_string()))?;
    let recomputed = hex::encode(digest_bytes(algo, &payload_bytes)?);
    if recomputed != snapshot.digest {
        return Ok(false);
    }
    if let Some(block) = &snapshot.signature {
        let digest_raw = digest_bytes(algo, &payload_bytes)?;
        return crate::vm::signing::verify_digest(&digest_raw, block);
    }
    Ok(true)
}

pub fn to_json_string(snapshot: &Snapshot) -> Result<String, VmError> {
    serde_json::to_string_pretty(snapshot).map_err(|e| VmError::InvalidBytecode(e.to_string()))
}

pub fn from_json_str(s: &str) -> Result<Snapshot, VmError> {
    serde_json::from_str(s).map_err(|e| VmError::InvalidBytecode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::text;
    use crate::vm::opcode::Opcode;

    #[test]
    fn round_trip_preserves_digest() {
        let isr = Isr::new();
        let constants = vec![text("2+2 = 4")];
        let program = vec![Instruction::new(Opcode::PushConst, 0), Instruction::bare(Opcode::StoreAnswer), Instruction::bare(Opcode::Halt)];
        let snapshot = build_snapshot(&program, &constants, &isr, json!({}), SnapshotDigestAlgo::Blake2b256).unwrap();
        let encoded = to_json_string(&snapshot).unwrap();
        let decoded = from_json_str(&encoded).unwrap();
        assert_eq!(decoded.digest, snapshot.digest);
        assert!(verify_snapshot(&decoded, SnapshotDigestAlgo::Blake2b256).unwrap());
    }

    #[test]
    fn tampered_state_fails_verification() {
        let isr = Isr::new();
        let constants = vec![text("x")];
        let program = vec![Instruction::bare(Opcode::Halt)];
        let mut snapshot = build_snapshot(&program, &constants, &isr, json!({}), SnapshotDigestAlgo::Blake2b256).unwrap();
        snapshot.state.isr = json!({"tampered": true});
        assert!(!verify_snapshot(&snapshot, SnapshotDigestAlgo::Blake2b256).unwrap());
    }
}
