// src/common/id_generator.rs
//! Crockford Base32 ID Generator
//!
//! Generates human-readable, prefixed IDs using Crockford Base32 encoding.
//! Format: PREFIX_XXXXXXXX (e.g., C_K7NP3X2Q for cars)

use rand::Rng;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Random characters after the prefix
const ID_LENGTH: usize = 8;

/// Entity type prefixes for ID generation
#[derive(Debug, Clone, Copy)]
pub enum EntityPrefix {
    /// User (U_)
    User,
    /// Car (C_)
    Car,
    /// Mod (M_)
    Mod,
    /// Media (F_) - F for File
    Media,
    /// Analytics event (A_)
    Analytics,
    /// Raw visit event (E_)
    Event,
}

impl EntityPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::User => "U",
            EntityPrefix::Car => "C",
            EntityPrefix::Mod => "M",
            EntityPrefix::Media => "F",
            EntityPrefix::Analytics => "A",
            EntityPrefix::Event => "E",
        }
    }
}

fn generate_crockford_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..32);
            CROCKFORD_ALPHABET[idx] as char
        })
        .collect()
}

/// Generate a prefixed ID in the format "PREFIX_XXXXXXXX"
pub fn generate_id(prefix: EntityPrefix) -> String {
    format!("{}_{}", prefix.as_str(), generate_crockford_string(ID_LENGTH))
}

/// Generate a raw Crockford Base32 string without prefix, used for object keys
pub fn generate_raw_id(length: usize) -> String {
    generate_crockford_string(length)
}

pub fn generate_user_id() -> String {
    generate_id(EntityPrefix::User)
}

pub fn generate_car_id() -> String {
    generate_id(EntityPrefix::Car)
}

pub fn generate_mod_id() -> String {
    generate_id(EntityPrefix::Mod)
}

pub fn generate_media_id() -> String {
    generate_id(EntityPrefix::Media)
}

pub fn generate_analytics_id() -> String {
    generate_id(EntityPrefix::Analytics)
}

pub fn generate_event_id() -> String {
    generate_id(EntityPrefix::Event)
}
