//! Study programs offered by a university.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::text_enum::text_enum;
use super::validation::{field_error, in_range, required_text, text_between};
use super::{DegreeLevel, Error, ProgramId, UniversityId};

text_enum! {
    /// Archived programs are hidden from students but kept for history.
    pub enum ProgramStatus {
        Active => "active",
        Archived => "archived",
    }
}

/// A program listed on a university page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: ProgramId,
    pub university_id: UniversityId,
    pub name: String,
    pub degree_level: DegreeLevel,
    pub field_category: String,
    pub tuition_fee_usd: Option<i32>,
    pub duration_months: i32,
    pub intakes: Vec<String>,
    pub status: ProgramStatus,
    pub created_at: DateTime<Utc>,
}

/// Editable program fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramDraft {
    pub name: String,
    pub degree_level: DegreeLevel,
    pub field_category: String,
    pub tuition_fee_usd: Option<i32>,
    pub duration_months: i32,
    pub intakes: Vec<String>,
}

const MAX_INTAKES: usize = 12;
const INTAKE_MAX_LEN: usize = 40;
const TUITION_MAX: i32 = 1_000_000;

impl ProgramDraft {
    /// Validate the draft, trimming text and de-duplicating intakes.
    pub fn validate(self) -> Result<Self, Error> {
        let mut intakes: Vec<String> = Vec::with_capacity(self.intakes.len());
        for raw in &self.intakes {
            let intake = required_text("intakes", raw, INTAKE_MAX_LEN)?;
            if !intakes.contains(&intake) {
                intakes.push(intake);
            }
        }
        if intakes.len() > MAX_INTAKES {
            return Err(field_error(
                "intakes",
                "too_many",
                format!("at most {MAX_INTAKES} intakes may be listed"),
            ));
        }
        let tuition_fee_usd = match self.tuition_fee_usd {
            Some(fee) => Some(in_range("tuitionFeeUsd", fee, 0, TUITION_MAX)?),
            None => None,
        };
        Ok(Self {
            name: text_between("name", &self.name, 2, 150)?,
            degree_level: self.degree_level,
            field_category: required_text("fieldCategory", &self.field_category, 80)?,
            tuition_fee_usd,
            duration_months: in_range("durationMonths", self.duration_months, 1, 120)?,
            intakes,
        })
    }

    /// New active program for `university_id`.
    #[must_use]
    pub fn into_program(self, university_id: UniversityId, now: DateTime<Utc>) -> Program {
        Program {
            id: ProgramId::random(),
            university_id,
            name: self.name,
            degree_level: self.degree_level,
            field_category: self.field_category,
            tuition_fee_usd: self.tuition_fee_usd,
            duration_months: self.duration_months,
            intakes: self.intakes,
            status: ProgramStatus::Active,
            created_at: now,
        }
    }

    /// Overwrite the editable fields of `program`.
    pub fn apply_to(self, program: &mut Program) {
        program.name = self.name;
        program.degree_level = self.degree_level;
        program.field_category = self.field_category;
        program.tuition_fee_usd = self.tuition_fee_usd;
        program.duration_months = self.duration_months;
        program.intakes = self.intakes;
    }
}
