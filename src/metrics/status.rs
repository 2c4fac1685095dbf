//! Status classification shared by every metric.
//!
//! CRM statuses are free text ("Contrato firmado", "En producción",
//! "Rechazado por financiamiento"...). One ordered keyword table decides both
//! the pipeline stage and the pending/completed/rejected bucket, so period,
//! executive and pipeline metrics always agree.

use serde::{Deserialize, Serialize};

use crate::models::Sale;

/// Pipeline stages in workflow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    #[serde(rename = "Pre-ingreso")]
    PreIngreso,
    #[serde(rename = "Validación")]
    Validacion,
    #[serde(rename = "Contrato")]
    Contrato,
    #[serde(rename = "Confirmación")]
    Confirmacion,
    #[serde(rename = "Producción")]
    Produccion,
    #[serde(rename = "Entrega OK")]
    EntregaOk,
    #[serde(rename = "Completado")]
    Completado,
}

impl Stage {
    pub const ALL: [Stage; 7] = [
        Stage::PreIngreso,
        Stage::Validacion,
        Stage::Contrato,
        Stage::Confirmacion,
        Stage::Produccion,
        Stage::EntregaOk,
        Stage::Completado,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Stage::PreIngreso => "Pre-ingreso",
            Stage::Validacion => "Validación",
            Stage::Contrato => "Contrato",
            Stage::Confirmacion => "Confirmación",
            Stage::Produccion => "Producción",
            Stage::EntregaOk => "Entrega OK",
            Stage::Completado => "Completado",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Coarse outcome bucket used by period and executive metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Pending,
    Completed,
    Rejected,
}

/// Result of classifying one status text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusClass {
    pub stage: Stage,
    /// `None` when no keyword matched.
    pub outcome: Option<Outcome>,
}

#[derive(Debug, Clone, Copy)]
enum Rule {
    Stage(Stage),
    Rejected,
}

/// Lowercase substrings, first match wins.
const STATUS_KEYWORDS: &[(&str, Rule)] = &[
    ("rechaz", Rule::Rejected),
    ("cancel", Rule::Rejected),
    ("completad", Rule::Stage(Stage::Completado)),
    ("entrega ok", Rule::Stage(Stage::EntregaOk)),
    ("producci", Rule::Stage(Stage::Produccion)),
    ("fabricaci", Rule::Stage(Stage::Produccion)),
    ("confirmaci", Rule::Stage(Stage::Confirmacion)),
    ("contrato", Rule::Stage(Stage::Contrato)),
    ("validaci", Rule::Stage(Stage::Validacion)),
    ("revisi", Rule::Stage(Stage::Validacion)),
    ("pre-ingreso", Rule::Stage(Stage::PreIngreso)),
    ("preingreso", Rule::Stage(Stage::PreIngreso)),
    ("pre ingreso", Rule::Stage(Stage::PreIngreso)),
    ("pendiente", Rule::Stage(Stage::PreIngreso)),
    ("ingresad", Rule::Stage(Stage::PreIngreso)),
];

/// Classify a raw CRM status. Unmatched text lands in `Pre-ingreso` with no
/// outcome; rejected sales also sit in `Pre-ingreso` for the pipeline.
pub fn classify_status(raw: &str) -> StatusClass {
    let status = raw.to_lowercase();
    let rule = STATUS_KEYWORDS
        .iter()
        .find(|(keyword, _)| status.contains(keyword))
        .map(|(_, rule)| *rule);

    match rule {
        Some(Rule::Rejected) => StatusClass {
            stage: Stage::PreIngreso,
            outcome: Some(Outcome::Rejected),
        },
        Some(Rule::Stage(stage @ (Stage::EntregaOk | Stage::Completado))) => StatusClass {
            stage,
            outcome: Some(Outcome::Completed),
        },
        Some(Rule::Stage(stage)) => StatusClass {
            stage,
            outcome: Some(Outcome::Pending),
        },
        None => StatusClass {
            stage: Stage::PreIngreso,
            outcome: None,
        },
    }
}

/// Pending/completed/rejected tallies over a set of sales.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    pub pending: usize,
    pub completed: usize,
    pub rejected: usize,
}

impl OutcomeCounts {
    pub fn tally<'a, I>(sales: I) -> Self
    where
        I: IntoIterator<Item = &'a Sale>,
    {
        let mut counts = Self::default();
        for sale in sales {
            counts.add(&sale.status);
        }
        counts
    }

    pub fn add(&mut self, status: &str) {
        match classify_status(status).outcome {
            Some(Outcome::Pending) => self.pending += 1,
            Some(Outcome::Completed) => self.completed += 1,
            Some(Outcome::Rejected) => self.rejected += 1,
            None => {}
        }
    }
}

/// Position of a stage in [`Stage::ALL`].
pub(crate) fn stage_slot(stage: Stage) -> usize {
    stage.index()
}
