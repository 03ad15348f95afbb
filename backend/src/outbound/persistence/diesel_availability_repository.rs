//! PostgreSQL-backed `AvailabilityRepository`.
//!
//! A profile is one header row plus its weekly slots; saving replaces the
//! slots wholesale inside one transaction.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};

use crate::domain::AvailabilityProfile;
use crate::domain::UniversityId;
use crate::domain::ports::{AvailabilityRepository, RepositoryError};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{AvailabilityProfileRow, AvailabilitySlotRow};
use super::pool::DbPool;
use super::schema::{availability_profiles, availability_slots};

/// Diesel-backed implementation of the `AvailabilityRepository` port.
#[derive(Clone)]
pub struct DieselAvailabilityRepository {
    pool: DbPool,
}

impl DieselAvailabilityRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AvailabilityRepository for DieselAvailabilityRepository {
    async fn find(
        &self,
        university_id: &UniversityId,
    ) -> Result<Option<AvailabilityProfile>, RepositoryError> {
        let id = *university_id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let Some(header) = availability_profiles::table
            .find(id)
            .select(AvailabilityProfileRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
        else {
            return Ok(None);
        };
        let slots: Vec<AvailabilitySlotRow> = availability_slots::table
            .filter(availability_slots::university_id.eq(id))
            .select(AvailabilitySlotRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        header.join(slots).map(Some)
    }

    async fn save(&self, profile: &AvailabilityProfile) -> Result<(), RepositoryError> {
        let (header, slots) = AvailabilityProfileRow::split(profile);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                diesel::insert_into(availability_profiles::table)
                    .values(&header)
                    .on_conflict(availability_profiles::university_id)
                    .do_update()
                    .set((
                        availability_profiles::meeting_duration_minutes
                            .eq(excluded(availability_profiles::meeting_duration_minutes)),
                        availability_profiles::buffer_minutes
                            .eq(excluded(availability_profiles::buffer_minutes)),
                        availability_profiles::min_notice_hours
                            .eq(excluded(availability_profiles::min_notice_hours)),
                        availability_profiles::booking_window_days
                            .eq(excluded(availability_profiles::booking_window_days)),
                        availability_profiles::utc_offset_minutes
                            .eq(excluded(availability_profiles::utc_offset_minutes)),
                        availability_profiles::is_active
                            .eq(excluded(availability_profiles::is_active)),
                        availability_profiles::updated_at
                            .eq(excluded(availability_profiles::updated_at)),
                    ))
                    .execute(conn)
                    .await?;
                diesel::delete(
                    availability_slots::table
                        .filter(availability_slots::university_id.eq(header.university_id)),
                )
                .execute(conn)
                .await?;
                if !slots.is_empty() {
                    diesel::insert_into(availability_slots::table)
                        .values(&slots)
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}
