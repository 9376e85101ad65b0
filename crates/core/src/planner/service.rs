//! Scheduling services: fetch through the ports, run the pipelines, then
//! archive and submit.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use futures::future::try_join_all;
use scheduleprep_domain::{
    BufferTimeObject, CalendarEvent, MeetingAssist, MeetingAssistAttendee,
    MeetingAssistPreferredTimeRange, PlanArchive, PlannerEventPart, PlannerRequestBody,
    ReplanArchiveContext, Result, ScheduleError, UserPreference,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::assembler::{assemble, RequestEnvelope};
use super::format::tag_daily_weekly_tasks;
use super::pipelines::{
    external_pipeline, host_pipeline, internal_pipeline, ExternalAttendeeData, InternalAttendeeData,
    PlanningContext,
};
use crate::buffer_time::create_buffer_time_for_event;
use crate::meeting_event::{calendar_event_from_assist_event, generate_new_meeting_event};
use crate::scheduling_ports::{MeetingAssistRepository, PreferenceRepository};
use crate::solver::{archive_key, SolverGateway, SubmissionReceipt};
use crate::time_math::{civil_to_instant, parse_timezone};
use crate::usage::UsageMeter;

/// Values copied into every request envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionSettings {
    pub callback_url: String,
    pub delay_ms: u64,
}

/// Fully fetched input for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanInput {
    pub ctx: PlanningContext,
    /// Runs through its own pipeline unless it also appears in `internal`.
    pub host: InternalAttendeeData,
    pub internal: Vec<InternalAttendeeData>,
    pub external: Vec<ExternalAttendeeData>,
    pub old_events: Vec<CalendarEvent>,
    pub new_host_buffer_times: Vec<BufferTimeObject>,
    pub replan: Option<ReplanArchiveContext>,
}

/// A request ready to submit together with its archive snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedPlan {
    pub request: PlannerRequestBody,
    pub archive: PlanArchive,
}

impl PreparedPlan {
    /// Rewrite every part, keeping request and archive in step.
    pub fn map_parts(mut self, f: impl Fn(PlannerEventPart) -> PlannerEventPart) -> Self {
        self.request.event_parts = self.request.event_parts.into_iter().map(f).collect();
        self.archive.event_parts = self.request.event_parts.clone();
        self
    }
}

/// Runs one scheduling pass end to end.
pub struct SchedulingService {
    preferences: Arc<dyn PreferenceRepository>,
    gateway: SolverGateway,
    settings: SubmissionSettings,
    usage: Option<UsageMeter>,
}

impl SchedulingService {
    pub fn new(
        preferences: Arc<dyn PreferenceRepository>,
        gateway: SolverGateway,
        settings: SubmissionSettings,
    ) -> Self {
        Self { preferences, gateway, settings, usage: None }
    }

    /// Decrement the host's usage counter after each accepted submission.
    pub fn with_usage_meter(mut self, meter: UsageMeter) -> Self {
        self.usage = Some(meter);
        self
    }

    pub fn preferences(&self) -> &Arc<dyn PreferenceRepository> {
        &self.preferences
    }

    /// Stored preferences, or working defaults when none exist.
    pub async fn load_preferences(&self, user_id: &str) -> Result<UserPreference> {
        match self.preferences.get_user_preferences(user_id).await? {
            Some(prefs) => Ok(prefs),
            None => {
                warn!(user_id, "no stored preferences; using defaults");
                Ok(UserPreference::defaults_for(user_id))
            }
        }
    }

    /// Fetch everything the internal pipeline needs for one user.
    pub async fn load_internal_attendee(
        &self,
        user_id: &str,
        timezone: Tz,
        window: (DateTime<Utc>, DateTime<Utc>),
    ) -> Result<InternalAttendeeData> {
        let preferences = self.load_preferences(user_id).await?;
        self.load_internal_attendee_with(user_id, timezone, window, preferences).await
    }

    /// As [`Self::load_internal_attendee`] with preferences already known.
    pub async fn load_internal_attendee_with(
        &self,
        user_id: &str,
        timezone: Tz,
        window: (DateTime<Utc>, DateTime<Utc>),
        preferences: UserPreference,
    ) -> Result<InternalAttendeeData> {
        let calendar = self.preferences.get_global_calendar(user_id).await?;
        let events = self.preferences.list_events_for_user(user_id, window.0, window.1).await?;
        let events = self.with_preferred_time_ranges(events).await?;

        Ok(InternalAttendeeData {
            user_id: user_id.to_string(),
            timezone,
            preferences,
            calendar,
            events,
        })
    }

    async fn with_preferred_time_ranges(&self, events: Vec<CalendarEvent>) -> Result<Vec<CalendarEvent>> {
        let repo = &self.preferences;
        try_join_all(events.into_iter().map(|mut event| async move {
            event.preferred_time_ranges = repo.list_preferred_time_ranges_for_event(&event.id).await?;
            Ok::<_, ScheduleError>(event)
        }))
        .await
    }

    /// Run the pipelines and assemble the request and its archive.
    #[instrument(skip_all, fields(host_id = %input.ctx.host_id))]
    pub async fn prepare(&self, input: PlanInput) -> Result<PreparedPlan> {
        let ctx = &input.ctx;
        let mut outputs = Vec::with_capacity(3);
        if !input.internal.iter().any(|attendee| attendee.user_id == input.host.user_id) {
            outputs.push(host_pipeline(ctx, &input.host));
        }
        outputs.push(internal_pipeline(ctx, &input.internal));
        outputs.push(external_pipeline(ctx, &input.external));

        let singleton_id = Uuid::new_v4().to_string();
        let replanned_event = input.replan.as_ref().map(|replan| replan.original_event_id.as_str());
        let envelope = RequestEnvelope {
            file_key: archive_key(&ctx.host_id, &singleton_id, replanned_event),
            singleton_id,
            host_id: ctx.host_id.clone(),
            delay: self.settings.delay_ms,
            call_back_url: self.settings.callback_url.clone(),
        };
        let mut plan = assemble(outputs, envelope)?;

        let recurring: BTreeSet<String> = plan
            .request
            .event_parts
            .iter()
            .filter_map(|part| part.recurring_event_id.clone())
            .collect();
        if !recurring.is_empty() {
            let ids: Vec<String> = recurring.into_iter().collect();
            let parents = self.preferences.list_events_with_ids(&ids).await?;
            plan.request.event_parts = tag_daily_weekly_tasks(plan.request.event_parts, &parents);
        }

        let archive = PlanArchive {
            singleton_id: plan.request.singleton_id.clone(),
            host_id: ctx.host_id.clone(),
            host_timezone: ctx.host_tz.name().to_string(),
            event_parts: plan.request.event_parts.clone(),
            all_events: plan.all_events,
            breaks: plan.breaks,
            old_events: input.old_events,
            new_host_buffer_times: input.new_host_buffer_times,
            timeslots: plan.request.timeslots.clone(),
            user_list: plan.request.user_list.clone(),
            replan: input.replan,
        };

        info!(
            singleton_id = %plan.request.singleton_id,
            parts = plan.request.event_parts.len(),
            slots = plan.request.timeslots.len(),
            users = plan.request.user_list.len(),
            "request assembled"
        );
        Ok(PreparedPlan { request: plan.request, archive })
    }

    /// Archive, submit, then record usage for the host.
    pub async fn submit(&self, prepared: &PreparedPlan) -> Result<SubmissionReceipt> {
        let receipt = self.gateway.submit(&prepared.archive, &prepared.request).await?;
        if let Some(meter) = &self.usage {
            if let Err(err) = meter.record_submission(&prepared.request.host_id).await {
                warn!(error = %err, "usage update failed after submission");
            }
        }
        Ok(receipt)
    }

    pub async fn run(&self, input: PlanInput) -> Result<SubmissionReceipt> {
        let prepared = self.prepare(input).await?;
        self.submit(&prepared).await
    }
}

/// Plans a new meeting from a meeting-assist record.
pub struct MeetingAssistScheduler {
    meetings: Arc<dyn MeetingAssistRepository>,
    service: Arc<SchedulingService>,
}

impl MeetingAssistScheduler {
    pub fn new(meetings: Arc<dyn MeetingAssistRepository>, service: Arc<SchedulingService>) -> Self {
        Self { meetings, service }
    }

    #[instrument(skip(self))]
    pub async fn schedule(&self, meeting_id: &str) -> Result<SubmissionReceipt> {
        let assist = self
            .meetings
            .get_meeting_assist(meeting_id)
            .await?
            .ok_or_else(|| ScheduleError::NotFound(format!("meeting assist {meeting_id}")))?;
        let host_tz = parse_timezone(&assist.timezone).ok_or_else(|| {
            ScheduleError::InvalidInput(format!("unknown host timezone {}", assist.timezone))
        })?;

        let attendees = self.meetings.list_attendees(meeting_id).await?;
        let preferred = self.meetings.list_preferred_time_ranges(meeting_id).await?.into_iter().next();

        let window = (assist.window_start_date, assist.window_end_date);
        let ctx = PlanningContext {
            host_id: assist.user_id.clone(),
            host_tz,
            window_start: window.0,
            window_end: window.1,
        };
        let fetch_window = (civil_to_instant(window.0, host_tz), civil_to_instant(window.1, host_tz));

        let (internal_attendees, external_attendees): (Vec<_>, Vec<_>) =
            attendees.iter().partition(|attendee| !attendee.external_attendee);

        let mut internal = try_join_all(internal_attendees.iter().map(|attendee| {
            let tz = attendee_timezone(attendee, host_tz);
            self.service.load_internal_attendee(attendee.owner_id(), tz, fetch_window)
        }))
        .await?;
        let old_events: Vec<CalendarEvent> =
            internal.iter().flat_map(|attendee| attendee.events.iter().cloned()).collect();

        let mut new_host_buffer_times = Vec::new();
        for (data, attendee) in internal.iter_mut().zip(&internal_attendees) {
            let calendar_id = data.calendar.as_ref().map(|calendar| calendar.id.clone());
            let event = generate_new_meeting_event(
                attendee,
                &assist,
                window,
                host_tz,
                calendar_id.as_deref(),
                preferred.as_ref(),
            );
            if data.user_id == assist.user_id {
                let (anchor, buffers) = host_buffers(&assist, event);
                data.events.extend(buffers.events().cloned());
                data.events.push(anchor);
                if buffers.events().next().is_some() {
                    new_host_buffer_times.push(buffers);
                }
            } else {
                data.events.push(event);
            }
        }

        let external = try_join_all(external_attendees.iter().map(|attendee| {
            self.load_external_attendee(attendee, &assist, fetch_window, host_tz, preferred.as_ref())
        }))
        .await?;

        let host = match internal.iter().find(|attendee| attendee.user_id == assist.user_id) {
            Some(host) => host.clone(),
            None => self.service.load_internal_attendee(&assist.user_id, host_tz, fetch_window).await?,
        };

        info!(
            internal = internal.len(),
            external = external.len(),
            "meeting assist attendees loaded"
        );
        self.service
            .run(PlanInput {
                ctx,
                host,
                internal,
                external,
                old_events,
                new_host_buffer_times,
                replan: None,
            })
            .await
    }

    async fn load_external_attendee(
        &self,
        attendee: &MeetingAssistAttendee,
        assist: &MeetingAssist,
        window: (DateTime<Utc>, DateTime<Utc>),
        host_tz: Tz,
        preferred: Option<&MeetingAssistPreferredTimeRange>,
    ) -> Result<ExternalAttendeeData> {
        let history = self.meetings.list_events_for_attendee(&attendee.id, window.0, window.1).await?;
        let explicit_preferences =
            self.meetings.list_external_attendee_preferences(&assist.id, &attendee.id).await?;

        let mut events: Vec<CalendarEvent> = history
            .iter()
            .map(|event| calendar_event_from_assist_event(event, attendee))
            .collect();
        let civil_window = (assist.window_start_date, assist.window_end_date);
        events.push(generate_new_meeting_event(attendee, assist, civil_window, host_tz, None, preferred));

        Ok(ExternalAttendeeData {
            user_id: attendee.owner_id().to_string(),
            timezone: attendee_timezone(attendee, host_tz),
            events,
            explicit_preferences,
        })
    }
}

fn attendee_timezone(attendee: &MeetingAssistAttendee, host_tz: Tz) -> Tz {
    attendee.timezone.as_deref().and_then(parse_timezone).unwrap_or(host_tz)
}

fn host_buffers(assist: &MeetingAssist, event: CalendarEvent) -> (CalendarEvent, BufferTimeObject) {
    match assist.buffer_time {
        Some(config) if !config.is_empty() => {
            let buffered = create_buffer_time_for_event(&event, config);
            (buffered.anchor, buffered.buffers)
        }
        _ => (event, BufferTimeObject::default()),
    }
}
