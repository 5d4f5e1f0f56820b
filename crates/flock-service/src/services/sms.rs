//! SMS report reminders
//!
//! Members with a phone number who have not reported for a month get one
//! reminder. The SMS log is the record of who was already messaged, so
//! running the reminder twice for a month never texts anyone twice.

use std::collections::HashSet;

use flock_core::entities::SmsLog;
use flock_core::value_objects::ServiceMonth;
use tracing::{error, info, instrument, warn};

use crate::dto::{ReminderSummary, SendRemindersRequest, SmsLogResponse};
use crate::gate::Actor;

use super::context::ServiceContext;
use super::error::ServiceResult;

const DEFAULT_REMINDER: &str =
    "Hello {name}, this is a reminder to submit your field service report for {month}.";

pub struct SmsService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SmsService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Text every unreported, not yet messaged member for the month
    ///
    /// Defaults to the previous month. Gateway failures are counted and
    /// logged; the member stays eligible for the next run. A text that went
    /// out but could not be logged is counted as `unlogged` and logged at
    /// error level, and the run carries on with the remaining members.
    #[instrument(skip(self, actor, request), fields(actor = %actor.member_id))]
    pub async fn send_reminders(
        &self,
        actor: &Actor,
        request: SendRemindersRequest,
    ) -> ServiceResult<ReminderSummary> {
        self.ctx.gate().authorize(actor, "sms:send")?;

        let month = request
            .month
            .unwrap_or_else(|| ServiceMonth::current().previous());
        let template = request.message.as_deref().unwrap_or(DEFAULT_REMINDER);

        let reported: HashSet<_> = self
            .ctx
            .storage(self.ctx.report_repo().find_by_month(month))
            .await?
            .into_iter()
            .map(|r| r.member_id)
            .collect();
        let recipients = self
            .ctx
            .storage(self.ctx.member_repo().find_with_phone())
            .await?;

        let mut summary = ReminderSummary {
            month,
            sent: 0,
            already_reported: 0,
            already_messaged: 0,
            failed: 0,
            unlogged: 0,
        };

        for member in recipients {
            let Some(phone) = member.phone.as_deref().map(str::trim).filter(|p| !p.is_empty())
            else {
                continue;
            };

            if reported.contains(&member.id) {
                summary.already_reported += 1;
                continue;
            }

            let previous = self
                .ctx
                .storage(
                    self.ctx
                        .sms_log_repo()
                        .find_by_recipient_and_month(member.id, month),
                )
                .await?;
            if !previous.is_empty() {
                summary.already_messaged += 1;
                continue;
            }

            let message = render(template, &member.full_name, month);
            if let Err(e) = self.ctx.sms_gateway().send(phone, &message).await {
                warn!(member_id = %member.id, error = %e, "Reminder SMS failed");
                summary.failed += 1;
                continue;
            }

            summary.sent += 1;

            let entry = SmsLog::new(member.id, phone.to_string(), message, actor.member_id, month);
            if let Err(e) = self
                .ctx
                .storage(self.ctx.sms_log_repo().append(&entry))
                .await
            {
                // Without the entry this member would be texted again next run
                error!(
                    member_id = %member.id,
                    month = %month,
                    error = %e,
                    "Reminder sent but SMS log write failed"
                );
                summary.unlogged += 1;
            }
        }

        info!(
            month = %month,
            sent = summary.sent,
            already_reported = summary.already_reported,
            already_messaged = summary.already_messaged,
            failed = summary.failed,
            unlogged = summary.unlogged,
            "Report reminders finished"
        );
        Ok(summary)
    }

    /// SMS log for a month, newest first
    #[instrument(skip(self, actor), fields(actor = %actor.member_id))]
    pub async fn logs(
        &self,
        actor: &Actor,
        month: ServiceMonth,
    ) -> ServiceResult<Vec<SmsLogResponse>> {
        self.ctx.gate().authorize(actor, "sms:send")?;

        let entries = self
            .ctx
            .storage(self.ctx.sms_log_repo().find_by_month(month))
            .await?;
        Ok(entries.into_iter().map(SmsLogResponse::from).collect())
    }
}

fn render(template: &str, name: &str, month: ServiceMonth) -> String {
    template
        .replace("{name}", name)
        .replace("{month}", &month.to_string())
}
