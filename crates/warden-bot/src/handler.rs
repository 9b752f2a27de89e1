//! Gateway event handling: turns form submissions into intake calls.

use chrono::Utc;
use serenity::{
  all::{ChannelId, Context, EventHandler, Message, Ready},
  async_trait,
};
use tracing::{debug, error, info, warn};
use warden_core::{application::Snowflake, submission::FormField};
use warden_review::Error;

use crate::Review;

pub struct Handler {
  review:               Review,
  applications_channel: ChannelId,
}

impl Handler {
  pub fn new(review: Review, applications_channel: ChannelId) -> Self {
    Self { review, applications_channel }
  }

  async fn ingest(&self, ctx: &Context, msg: &Message) {
    // The form collector edits its embed in shortly after posting.
    tokio::time::sleep(self.review.settings().ingest_delay()).await;

    let msg = match msg.channel_id.message(&ctx.http, msg.id).await {
      Ok(m) => m,
      Err(e) => {
        warn!(message_id = %msg.id, error = %e, "submission vanished before ingest");
        return;
      }
    };

    let Some(embed) = msg.embeds.first() else {
      debug!(message_id = %msg.id, "message has no embed");
      self.review.status("Ignored a message without a form embed.".into()).await;
      return;
    };

    let fields: Vec<FormField> = embed
      .fields
      .iter()
      .map(|f| FormField::new(f.name.clone(), f.value.clone()))
      .collect();

    match self.review.intake(Snowflake(msg.id.get()), &fields, Utc::now()).await {
      Ok(app) => info!(applicant_id = %app.applicant_id, "submission ingested"),
      Err(Error::Core(e)) => {
        warn!(message_id = %msg.id, error = %e, "submission rejected");
        if matches!(e, warden_core::Error::MalformedSubmission(_)) {
          self.review.status(format!("Could not read a submission: {e}.")).await;
        }
      }
      Err(e) => error!(message_id = %msg.id, error = %e, "intake failed"),
    }
  }
}

#[async_trait]
impl EventHandler for Handler {
  async fn ready(&self, _ctx: Context, ready: Ready) {
    info!(user = %ready.user.name, guilds = ready.guilds.len(), "connected to gateway");
    self.review.status(format!("Logged in as {}", ready.user.name)).await;
  }

  async fn message(&self, ctx: Context, msg: Message) {
    if msg.channel_id != self.applications_channel {
      return;
    }
    if msg.author.id == ctx.cache.current_user().id {
      return;
    }
    info!(message_id = %msg.id, "form submission detected");
    self.ingest(&ctx, &msg).await;
  }
}
