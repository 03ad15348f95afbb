//! Student-facing operations: profile, discovery and interests.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    InterestRepository, ProgramRepository, StudentProfileRepository, UniversityRepository,
};
use crate::domain::validation::optional_text;
use crate::domain::{
    Error, Interest, InterestStatus, NotificationContent, NotificationKind, Notifier, ProgramId,
    ProgramStatus, StudentProfile, StudentProfileDraft, UniversityDetail, UniversityFilter,
    UniversityId, UniversityProfile, UserId,
};

const INTEREST_NOTE_MAX: usize = 1000;

/// Student profile, university discovery and interest service.
#[derive(Clone)]
pub struct StudentService {
    profiles: Arc<dyn StudentProfileRepository>,
    universities: Arc<dyn UniversityRepository>,
    programs: Arc<dyn ProgramRepository>,
    interests: Arc<dyn InterestRepository>,
    notifier: Notifier,
    clock: Arc<dyn Clock>,
}

impl StudentService {
    pub fn new(
        profiles: Arc<dyn StudentProfileRepository>,
        universities: Arc<dyn UniversityRepository>,
        programs: Arc<dyn ProgramRepository>,
        interests: Arc<dyn InterestRepository>,
        notifier: Notifier,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            profiles,
            universities,
            programs,
            interests,
            notifier,
            clock,
        }
    }

    /// The student's profile; `not_found` until it has been filled in.
    pub async fn get_profile(&self, student_id: &UserId) -> Result<StudentProfile, Error> {
        self.profiles
            .find(student_id)
            .await?
            .ok_or_else(|| Error::not_found("profile has not been completed yet"))
    }

    /// Create or replace the profile, keeping any uploaded CV.
    pub async fn upsert_profile(
        &self,
        student_id: UserId,
        draft: StudentProfileDraft,
    ) -> Result<StudentProfile, Error> {
        let draft = draft.validate()?;
        let existing = self.profiles.find(&student_id).await?;
        let profile = draft.into_profile(student_id, existing.as_ref(), self.clock.utc());
        self.profiles.upsert(&profile).await?;
        Ok(profile)
    }

    /// Verified universities matching the filter. Callers pass `limit + 1`
    /// to detect a following page.
    pub async fn browse_universities(
        &self,
        filter: UniversityFilter,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<UniversityProfile>, Error> {
        Ok(self
            .universities
            .browse(&filter.normalised(), offset, limit)
            .await?)
    }

    /// A verified university with its active programs.
    pub async fn university_detail(&self, id: &UniversityId) -> Result<UniversityDetail, Error> {
        let university = self.verified_university(id).await?;
        let programs = self.programs.list(id, false).await?;
        Ok(UniversityDetail {
            university,
            programs,
        })
    }

    async fn verified_university(&self, id: &UniversityId) -> Result<UniversityProfile, Error> {
        match self.universities.find(id).await? {
            Some(university) if university.is_verified() => Ok(university),
            _ => Err(Error::not_found("university not found")),
        }
    }

    /// Record interest in a university.
    ///
    /// Repeating the call while interested returns the stored row unchanged;
    /// calling it after a withdrawal revives the row. Both a new and a
    /// revived interest notify the university owner.
    pub async fn express_interest(
        &self,
        student_id: UserId,
        university_id: UniversityId,
        program_id: Option<ProgramId>,
        note: Option<String>,
    ) -> Result<Interest, Error> {
        let university = self.verified_university(&university_id).await?;
        if let Some(program_id) = program_id {
            self.ensure_program_offered(&university_id, &program_id).await?;
        }
        let note = optional_text("note", note.as_deref(), INTEREST_NOTE_MAX)?;
        let existing = self.interests.find(&student_id, &university_id).await?;
        let (interest, change) = Interest::express(
            existing,
            student_id,
            university_id,
            program_id,
            note,
            self.clock.utc(),
        );
        if !change.notifies_university() {
            return Ok(interest);
        }
        self.interests.upsert(&interest).await?;
        info!(%student_id, %university_id, ?change, "interest recorded");
        self.notifier
            .notify(
                university.owner_user_id,
                NotificationContent::new(
                    NotificationKind::InterestReceived,
                    "New interested student",
                    "A student is interested in your institution.",
                )
                .with_link("/university/interested-students"),
            )
            .await?;
        Ok(interest)
    }

    async fn ensure_program_offered(
        &self,
        university_id: &UniversityId,
        program_id: &ProgramId,
    ) -> Result<(), Error> {
        match self.programs.find(program_id).await? {
            Some(program)
                if program.university_id == *university_id
                    && program.status == ProgramStatus::Active =>
            {
                Ok(())
            }
            _ => Err(Error::invalid_request(
                "program does not belong to this university",
            )),
        }
    }

    /// Withdraw interest. Withdrawing twice is a no-op.
    pub async fn withdraw_interest(
        &self,
        student_id: UserId,
        university_id: UniversityId,
    ) -> Result<Interest, Error> {
        let mut interest = self
            .interests
            .find(&student_id, &university_id)
            .await?
            .ok_or_else(|| Error::not_found("no interest recorded for this university"))?;
        if interest.status == InterestStatus::Withdrawn {
            return Ok(interest);
        }
        interest.status = InterestStatus::Withdrawn;
        interest.updated_at = self.clock.utc();
        self.interests.upsert(&interest).await?;
        Ok(interest)
    }

    /// Every interest row of the student, withdrawn ones included.
    pub async fn list_interests(&self, student_id: &UserId) -> Result<Vec<Interest>, Error> {
        Ok(self.interests.list_for_student(student_id).await?)
    }
}

#[cfg(test)]
#[path = "student_service_tests.rs"]
mod tests;
