//! Core library for Brazilian fiscal document extraction.
//!
//! This crate provides:
//! - Document type classification (NF-e, NFS-e, boletos, tax guides, ...)
//! - Per-type, per-region pattern rules with a DEFAULT fallback
//! - Field primitives for BRL amounts, dates, CPF/CNPJ, access keys and payment codes
//! - Typed extractors for ten expense schemas
//! - Generative (OpenAI, Gemini) extraction and a router choosing between backends

pub mod ai;
pub mod error;
pub mod expense;
pub mod models;

pub use ai::{AiClient, AiPlan, GenerativeBackend, GenerativeExtractor};
pub use error::{ExtractionError, FiscalError, GenerativeError, Result};
pub use expense::rules::{
    fiscal_id_kind, format_fiscal_id, is_cnpj_valid, is_cpf_valid, validate_fiscal_id,
    FiscalIdKind,
};
pub use expense::{
    classify, Backend, ExpenseExtractor, ExtractionRouter, PatternRule, RuleBasedExtractor,
    RuleResolver, RuleStore, TenantPolicy,
};
pub use models::config::{AiProvider, EngineConfig};
pub use models::document::Document;
pub use models::expense::{Expense, ExpenseHeader, ExpenseType};
