//! Local validation of a prospective edit batch
//!
//! Pure, in-memory checks that run before any persistence call: required
//! fields, phone shape, and in-batch duplicate detection. The caller has
//! already normalized edits and dropped no-ops.

use once_cell::sync::Lazy;
use regex::Regex;
use renta_core::{push_reason, EditRejection, ProposedEdit};
use std::collections::HashMap;

/// Permissive phone shape: digits, spaces, `+`, `-`, and parentheses.
static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9+\-\s()]+$").expect("phone pattern is valid"));

/// Validate a prospective batch. Returns one merged rejection per failing
/// agent; empty means clean. Never mutates its input and is safe to call
/// repeatedly.
pub fn validate_batch(edits: &[ProposedEdit]) -> Vec<EditRejection> {
    let mut rejections = Vec::new();

    for edit in edits {
        let name = edit.new_name.trim();
        let phone = edit.new_phone.trim();

        if name.is_empty() {
            push_reason(
                &mut rejections,
                edit.agent_id,
                &edit.original_name,
                "name is required".to_string(),
            );
        }
        if phone.is_empty() {
            push_reason(
                &mut rejections,
                edit.agent_id,
                &edit.original_name,
                "phone is required".to_string(),
            );
        } else if !PHONE_PATTERN.is_match(phone) {
            push_reason(
                &mut rejections,
                edit.agent_id,
                &edit.original_name,
                "phone may only contain digits, spaces, +, - and parentheses".to_string(),
            );
        }
    }

    // In-batch duplicates: by case-insensitive name and by literal phone.
    // Every member of a colliding group is rejected.
    let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
    let mut by_phone: HashMap<String, Vec<usize>> = HashMap::new();
    for (index, edit) in edits.iter().enumerate() {
        let name = edit.new_name.trim();
        let phone = edit.new_phone.trim();
        if !name.is_empty() {
            by_name.entry(name.to_lowercase()).or_default().push(index);
        }
        if !phone.is_empty() {
            by_phone.entry(phone.to_string()).or_default().push(index);
        }
    }

    for edit in edits {
        let name_key = edit.new_name.trim().to_lowercase();
        if by_name.get(&name_key).map_or(false, |g| g.len() > 1) {
            push_reason(
                &mut rejections,
                edit.agent_id,
                &edit.original_name,
                format!("duplicate name \"{}\" in batch", edit.new_name.trim()),
            );
        }
        let phone_key = edit.new_phone.trim().to_string();
        if by_phone.get(&phone_key).map_or(false, |g| g.len() > 1) {
            push_reason(
                &mut rejections,
                edit.agent_id,
                &edit.original_name,
                format!("duplicate phone \"{}\" in batch", edit.new_phone.trim()),
            );
        }
    }

    rejections
}
