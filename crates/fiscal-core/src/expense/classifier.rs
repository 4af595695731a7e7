//! Document type classification.
//!
//! An ordered cascade of case-insensitive probes, most specific first.
//! The first category with a matching probe wins; there is no scoring.

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::models::expense::ExpenseType;

const CASCADE_SOURCE: &[(ExpenseType, &[&str])] = &[
    (ExpenseType::Nfse, &[r"\bNFS([\s-]?e)?\b"]),
    (ExpenseType::Nfce, &[r"\bNFC([\s-]?e)?\b"]),
    (
        ExpenseType::Nf3e,
        &[
            r"\bNF3([\s-]?e)?\b",
            r"Nota\s+Fiscal\s*-\s*Conta\s+de\s+Energia\s+El[eé]c?trica",
            r"Leitura\s+Anterior",
        ],
    ),
    (ExpenseType::Nfe, &[r"\bNF[\s-]?e\b"]),
    (
        ExpenseType::Darf,
        &[
            r"Documento\s+de\s+Arrecada[cç][aã]o\s+de\s+Receitas\s+Federais",
            r"\bDARF\b",
        ],
    ),
    (
        ExpenseType::Fgts,
        &[r"Guia\s+do\s+FGTS", r"\bFGTS\s+Digital\b", r"\bGFD\b", r"\bGRF\b"],
    ),
    (
        ExpenseType::Gps,
        &[
            r"Guia\s+da\s+Previd[eê]ncia\s+Social",
            r"(?s)\bGPS\b.*\bINSS\b",
            r"(?s)\bINSS\b.*\bGPS\b",
        ],
    ),
    (ExpenseType::Fatura, &[r"\bfatura\b"]),
    (
        ExpenseType::Boleto,
        &[
            r"boletos? (banc[aá]rios?)?",
            r"nosso\s+n[uú]mero",
            r"boletos?\s+de\s+pagamento",
            r"cobran[cç]as?",
            r"linha\s+digit[aá]vel",
        ],
    ),
    (ExpenseType::Cte, &[r"\bCT([\s-]?e)?\b"]),
];

lazy_static! {
    static ref CASCADE: Vec<(ExpenseType, Vec<Regex>)> = CASCADE_SOURCE
        .iter()
        .map(|(expense_type, probes)| {
            let regexes = probes
                .iter()
                .map(|probe| {
                    RegexBuilder::new(probe)
                        .case_insensitive(true)
                        .build()
                        .unwrap()
                })
                .collect();
            (*expense_type, regexes)
        })
        .collect();
}

/// Classify a document text. Never fails; unmatched text is `Outro`.
pub fn classify(text: &str) -> ExpenseType {
    let expense_type = CASCADE
        .iter()
        .find(|(_, probes)| probes.iter().any(|probe| probe.is_match(text)))
        .map(|(expense_type, _)| *expense_type)
        .unwrap_or(ExpenseType::Outro);

    debug!("Classified {} chars of text as {}", text.len(), expense_type);
    expense_type
}
