use futures::StreamExt;
use tokio::sync::broadcast;

use crate::app::{AppContext, Result};
use crate::browse::{request_page, PageRequest, PageUpdate, PaginationState};
use crate::domain::{Article, FetchOutcome, SideSignal};
use crate::pipeline::drain_signals;

pub async fn list_articles(
    ctx: &AppContext,
    offset: Option<usize>,
    search: Option<String>,
    all: bool,
) -> Result<()> {
    let mut signals = ctx.signals().subscribe();

    let search = match search {
        Some(term) => Some(term),
        None if !all && offset.is_none() => {
            let stored = ctx.preferences().selected()?;
            (!stored.is_empty()).then_some(stored)
        }
        None => None,
    };
    let request = PageRequest {
        offset: Some(offset.unwrap_or(0)),
        search,
    };

    let mut state = PaginationState::new();
    let update = request_page(&ctx.repository, &mut state, request).await;
    report_signals(&mut signals);

    match update {
        PageUpdate::Applied { .. } if state.items().is_empty() => println!("No data found"),
        PageUpdate::Applied { .. } => {
            for article in state.items() {
                println!("{}", article_line(article));
            }
            if let Some(count) = state.count() {
                println!("\n{} of {} articles", state.items().len(), count);
            }
        }
        PageUpdate::Failed(message) => eprintln!("Error: {}", message),
        PageUpdate::NoOutcome | PageUpdate::Skipped | PageUpdate::Stale => {}
    }

    Ok(())
}

pub async fn show_article(ctx: &AppContext, id: i64, open_in_browser: bool) -> Result<()> {
    let mut signals = ctx.signals().subscribe();
    let outcome = ctx.repository.article(id).next().await;
    report_signals(&mut signals);

    match outcome {
        Some(FetchOutcome::Success(article)) => {
            print!("{}", article_detail(&article));
            if open_in_browser {
                match article.url.as_deref() {
                    Some(url) => open::that(url)?,
                    None => eprintln!("Article has no link"),
                }
            }
        }
        Some(FetchOutcome::Error(message)) => eprintln!("Error: {}", message),
        None => {}
    }

    Ok(())
}

pub async fn list_sites(ctx: &AppContext, filter: Option<&str>) -> Result<()> {
    let mut signals = ctx.signals().subscribe();
    let outcome = ctx.repository.preferences().next().await;
    report_signals(&mut signals);

    match outcome {
        Some(FetchOutcome::Success(list)) => {
            let selected = ctx.preferences().selected()?;
            let sites = list.filter(filter.unwrap_or(""));
            if sites.is_empty() {
                println!("No data found");
            }
            for site in sites {
                let marker = if site == selected { "*" } else { " " };
                println!("{} {}", marker, site);
            }
        }
        Some(FetchOutcome::Error(message)) => eprintln!("Error: {}", message),
        None => {}
    }

    Ok(())
}

pub fn prefer_site(ctx: &AppContext, site: Option<&str>, clear: bool) -> Result<()> {
    let prefs = ctx.preferences();

    if clear {
        prefs.set_selected("")?;
        println!("Preference cleared");
        return Ok(());
    }

    match site {
        Some(site) => {
            prefs.set_selected(site)?;
            println!("Preferred site: {}", site);
        }
        None => {
            let selected = prefs.selected()?;
            if selected.is_empty() {
                println!("No preferred site");
            } else {
                println!("Preferred site: {}", selected);
            }
        }
    }

    Ok(())
}

/// Print user-facing side signals to stderr.
fn report_signals(rx: &mut broadcast::Receiver<SideSignal>) {
    for signal in drain_signals(rx) {
        if let Some(message) = signal.message() {
            eprintln!("{}", message);
        }
    }
}

pub fn article_line(article: &Article) -> String {
    let date = article.published_label().unwrap_or_default();
    format!(
        "{:>6}  {:<13} {}\n        {}",
        article.id,
        date,
        article.display_title(),
        article.display_site()
    )
}

pub fn article_detail(article: &Article) -> String {
    let mut out = format!("{}\n", article.display_title());
    let mut meta = vec![article.display_site().to_string()];
    if let Some(date) = article.published_label() {
        meta.push(date);
    }
    out.push_str(&meta.join(" | "));
    out.push('\n');
    if let Some(url) = &article.url {
        out.push_str(url);
        out.push('\n');
    }
    let summary = article.display_summary();
    if !summary.is_empty() {
        out.push('\n');
        out.push_str(&summary);
        out.push('\n');
    }
    out
}
