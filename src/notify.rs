//! Reporting of matched listings.

use crate::models::Listing;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::path::PathBuf;
use tracing::info;

/// Delivers a batch of listings somewhere a person will see them
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, listings: &[Listing]) -> Result<()>;
}

pub fn subject(date: NaiveDate) -> String {
    format!("New apartments for {}", date.format("%Y-%m-%d"))
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\'', "&#39;")
        .replace('"', "&quot;")
}

/// HTML table of listings, nearest first
pub fn render_report(listings: &[Listing]) -> String {
    let mut sorted: Vec<&Listing> = listings.iter().collect();
    sorted.sort_by(|a, b| a.distance_km().total_cmp(&b.distance_km()));

    let mut table = String::from(
        "<table><tr><th>Category</th><th>Price</th><th>Address</th><th>Distance</th><th>Link</th></tr>",
    );
    for listing in sorted {
        table.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.2}km</td><td><a href='{}'>Link</a></td></tr>",
            escape(listing.category()),
            escape(listing.price()),
            escape(listing.address()),
            listing.distance_km(),
            escape(listing.url()),
        ));
    }
    table.push_str("</table>");
    table
}

/// Writes each report as an HTML message file into an outbox directory,
/// for pickup by whatever mail relay is configured.
pub struct OutboxNotifier {
    dir: PathBuf,
    from: String,
    to: Vec<String>,
}

impl OutboxNotifier {
    pub fn new(dir: impl Into<PathBuf>, from: impl Into<String>, to: Vec<String>) -> Self {
        Self {
            dir: dir.into(),
            from: from.into(),
            to,
        }
    }

    fn message(&self, listings: &[Listing]) -> String {
        format!(
            "<!--\nFrom: {}\nTo: {}\nSubject: {}\n-->\n{}\n",
            self.from,
            self.to.join(", "),
            subject(Utc::now().date_naive()),
            render_report(listings)
        )
    }
}

#[async_trait]
impl Notifier for OutboxNotifier {
    async fn send(&self, listings: &[Listing]) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create outbox {}", self.dir.display()))?;

        let path = self
            .dir
            .join(format!("{}.html", Utc::now().format("%Y%m%dT%H%M%S%.3fZ")));
        tokio::fs::write(&path, self.message(listings))
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        info!("📬 Queued report of {} listings at {}", listings.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinates;
    use crate::models::ListingParts;

    fn listing(id: &str, address: &str, distance_km: f64) -> Listing {
        Listing::new(ListingParts {
            id: id.to_string(),
            url: format!("http://www.kijiji.ca/a/{}", id),
            title: "Apartment".to_string(),
            address: address.to_string(),
            price: "$2,000.00".to_string(),
            category: "1b".to_string(),
            coordinates: Coordinates::new(-79.38, 43.65),
            distance_km,
            content_hash: format!("c{}", id),
            image_hash: format!("i{}", id),
        })
        .unwrap()
    }

    #[test]
    fn test_subject() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(subject(date), "New apartments for 2024-03-07");
    }

    #[test]
    fn test_report_sorted_by_distance() {
        let report = render_report(&[
            listing("1", "Far Rd", 4.567),
            listing("2", "Near St", 0.5),
        ]);

        let near = report.find("Near St").unwrap();
        let far = report.find("Far Rd").unwrap();
        assert!(near < far);
        assert!(report.contains("<td>4.57km</td>"));
        assert!(report.contains("<td>0.50km</td>"));
        assert!(report.contains("<a href='http://www.kijiji.ca/a/2'>Link</a>"));
    }

    #[test]
    fn test_report_escapes_markup() {
        let report = render_report(&[listing("1", "<b>Loft</b> & co", 1.0)]);
        assert!(report.contains("&lt;b&gt;Loft&lt;/b&gt; &amp; co"));
    }

    #[tokio::test]
    async fn test_outbox_writes_message() {
        let dir = tempfile::tempdir().unwrap();
        let notifier = OutboxNotifier::new(
            dir.path().join("outbox"),
            "scout@example.com",
            vec!["me@example.com".to_string(), "you@example.com".to_string()],
        );

        notifier.send(&[listing("1", "Near St", 0.5)]).await.unwrap();

        let mut entries = std::fs::read_dir(dir.path().join("outbox")).unwrap();
        let path = entries.next().unwrap().unwrap().path();
        let message = std::fs::read_to_string(path).unwrap();
        assert!(message.contains("From: scout@example.com"));
        assert!(message.contains("To: me@example.com, you@example.com"));
        assert!(message.contains("Subject: New apartments for "));
        assert!(message.contains("Near St"));
    }
}
