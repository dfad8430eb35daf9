use std::sync::Arc;

use futures::future::join_all;

use crate::app::{AppContext, PulseError, Result};
use crate::domain::Pulse;
use crate::mutation::ToggleOutcome;
use crate::query::{search, SortKey, ARTICLE_FIELDS};
use crate::remote::Page;
use crate::view::{AccountView, HomeView, PulseDetailView, PulseFeedView};

pub async fn show_home(ctx: Arc<AppContext>, text: Option<&str>) -> Result<()> {
    let view = HomeView::new(ctx);
    view.refresh().await;
    if let Some(text) = text {
        view.trigger_search(text);
    }

    let stats = view.stats();
    println!(
        "{} articles, {} views, {} categories",
        stats.total_articles, stats.total_views, stats.total_categories
    );

    let categories = view.categories();
    if categories.is_empty() {
        println!("No categories");
        return Ok(());
    }

    for category in categories {
        println!();
        println!(
            "{} ({} articles, {} views)",
            category.name,
            category.article_count(),
            category.total_views
        );
        println!("  {}", category.summary);
        for article in category.preview() {
            println!(
                "  - {} [{}] {}",
                article.title,
                article.source,
                article.display_date()
            );
        }
    }
    Ok(())
}

pub async fn list_pulses(
    ctx: Arc<AppContext>,
    text: Option<&str>,
    sort: Option<SortKey>,
) -> Result<()> {
    let view = PulseFeedView::new(ctx);
    view.refresh().await;
    if let Some(text) = text {
        view.trigger_search(text);
    }
    if let Some(key) = sort.filter(|key| *key != view.sort_key()) {
        view.trigger_sort(key);
    }

    let pulses = view.visible();
    if pulses.is_empty() {
        println!("No pulses");
        return Ok(());
    }

    for pulse in pulses {
        print_pulse_line(&pulse);
    }
    Ok(())
}

fn print_pulse_line(pulse: &Pulse) {
    let marker = match pulse.is_saved {
        Some(true) => "*",
        Some(false) => " ",
        None => "",
    };
    println!(
        "{}{} [{}] {} ({} views, {})",
        marker,
        pulse.title,
        pulse.category,
        pulse.slug,
        pulse.views,
        pulse.display_date()
    );
}

pub async fn show_pulse(ctx: Arc<AppContext>, slug: &str) -> Result<()> {
    let view = PulseDetailView::new(ctx);
    view.load(slug).await;

    let pulse = view
        .pulse()
        .ok_or_else(|| PulseError::PulseNotFound(slug.to_string()))?;

    println!("{}", pulse.title);
    println!("{} | {} | {} views", pulse.category, pulse.display_date(), pulse.views);
    if let Some(saved) = pulse.is_saved {
        println!("Saved: {}", if saved { "yes" } else { "no" });
    }
    println!();
    println!("{}", pulse.content);
    Ok(())
}

pub async fn list_articles(
    ctx: &AppContext,
    page: u64,
    per_page: Option<u64>,
    text: Option<&str>,
) -> Result<()> {
    let per_page = per_page.unwrap_or(ctx.config.feed.page_size);
    let articles = ctx
        .fetcher
        .recent_articles(Page::new(page, per_page))
        .await;
    let visible = search(articles.as_slice(), text.unwrap_or_default(), ARTICLE_FIELDS);

    if visible.is_empty() {
        println!("No articles");
        return Ok(());
    }

    for article in visible {
        println!(
            "{} [{}] {} {}",
            article.title,
            article.category,
            article.source,
            article.display_date()
        );
        println!("    {}", article.url);
    }
    Ok(())
}

pub async fn list_saved(ctx: Arc<AppContext>) -> Result<()> {
    if !ctx.session.is_signed_in() {
        return Err(PulseError::AuthRequired);
    }

    let view = AccountView::new(ctx);
    view.refresh().await;

    let saved = view.saved();
    if saved.is_empty() {
        println!("No saved pulses");
        return Ok(());
    }

    for entry in saved {
        println!("{} ({})", entry.title, entry.relation.pulse_id);
        if !entry.blurb.is_empty() {
            println!("    {}", entry.blurb);
        }
    }
    Ok(())
}

pub async fn toggle_saved(ctx: Arc<AppContext>, pulse_ids: &[String]) -> Result<()> {
    let user_id = ctx.session.user_id().ok_or(PulseError::AuthRequired)?;

    // Seed the current flags before flipping them; without them the
    // direction of each toggle is unknown.
    let saved = ctx.fetcher.pulse_ids_saved_by(&user_id).await?;
    ctx.mutations.seed(
        pulse_ids
            .iter()
            .map(|id| (id.clone(), saved.contains(id))),
    );

    let outcomes = join_all(pulse_ids.iter().map(|id| ctx.mutations.toggle_save(id))).await;

    let mut failed = 0;
    for (pulse_id, outcome) in pulse_ids.iter().zip(outcomes) {
        match outcome? {
            ToggleOutcome::Saved => println!("Saved pulse {}", pulse_id),
            ToggleOutcome::Unsaved => println!("Removed pulse {} from saved", pulse_id),
            ToggleOutcome::RolledBack { reason, .. } => {
                failed += 1;
                eprintln!("  Error updating pulse {}: {}", pulse_id, reason);
            }
            ToggleOutcome::Superseded => {}
        }
    }

    if failed > 0 {
        return Err(PulseError::Other(format!(
            "{} of {} bookmark updates failed",
            failed,
            pulse_ids.len()
        )));
    }
    Ok(())
}
