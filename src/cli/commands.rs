use crate::app::{AppContext, Result, WeirError};
use crate::cli::{AllowAction, FilterAction, FilterTarget};
use crate::domain::{FilterRule, RetentionCutoff};
use crate::filter;
use crate::store::Store;

pub async fn add_feed(ctx: &AppContext, url: &str, title: Option<&str>) -> Result<()> {
    let feed = ctx.feeds.add(url, title).await?;
    println!("Added feed: {}", feed.display_title());
    Ok(())
}

pub async fn detect_feed(ctx: &AppContext, url: &str) -> Result<()> {
    match ctx.feeds.detect_feed_url(url).await? {
        Some(feed_url) => println!("{feed_url}"),
        None => println!("No feed found under {url}"),
    }
    Ok(())
}

pub fn remove_feed(ctx: &AppContext, url: &str) -> Result<()> {
    ctx.feeds.remove(url)?;
    println!("Removed feed: {url}");
    Ok(())
}

pub async fn sync(ctx: &AppContext) -> Result<()> {
    let outcome = ctx.sync.refresh().await?;
    println!(
        "Synced {} feeds: {} new articles, {} pruned",
        outcome.fetched, outcome.new_articles, outcome.deleted
    );
    Ok(())
}

pub fn list_feeds(ctx: &AppContext) -> Result<()> {
    let feeds = ctx.feeds.list()?;

    if feeds.is_empty() {
        println!("No feeds");
        return Ok(());
    }

    for feed in feeds {
        let unread = ctx.store.unread_count(feed.id)?;
        println!(
            "[{}] {} ({} unread)\n  {}",
            feed.id,
            feed.display_title(),
            unread,
            feed.url
        );
    }

    Ok(())
}

pub fn list_articles(ctx: &AppContext, show_suppressed: bool) -> Result<()> {
    let articles = ctx.store.get_all_articles()?;
    let rules = ctx.filters.list()?;
    let allow = ctx.allow_keywords.list()?;

    let mut shown = 0;
    for article in &articles {
        if !show_suppressed && filter::evaluate(article, &rules, &allow) {
            continue;
        }
        shown += 1;

        let read_marker = if article.is_read { " " } else { "●" };
        let star_marker = if article.is_starred { "★" } else { " " };
        println!(
            "[{}] {}{} {} {} ({})",
            article.id,
            read_marker,
            star_marker,
            article.published_at.format("%Y-%m-%d"),
            article.title,
            article.feed_name
        );
    }

    if shown == 0 {
        println!("No articles");
    }

    Ok(())
}

pub fn toggle_read(ctx: &AppContext, id: i64) -> Result<()> {
    let article = ctx
        .store
        .get_article(id)?
        .ok_or_else(|| WeirError::Validation(format!("no article with id {id}")))?;
    ctx.store.set_read(id, !article.is_read)?;
    println!(
        "{}: {}",
        article.title,
        if article.is_read { "unread" } else { "read" }
    );
    Ok(())
}

pub fn toggle_star(ctx: &AppContext, id: i64) -> Result<()> {
    let article = ctx
        .store
        .get_article(id)?
        .ok_or_else(|| WeirError::Validation(format!("no article with id {id}")))?;
    ctx.store.set_starred(id, !article.is_starred)?;
    println!(
        "{}: {}",
        article.title,
        if article.is_starred { "unstarred" } else { "starred" }
    );
    Ok(())
}

pub fn delete_article(ctx: &AppContext, id: i64) -> Result<()> {
    ctx.store.delete_article(id)?;
    println!("Deleted article {id}");
    Ok(())
}

pub fn filter_command(ctx: &AppContext, action: FilterAction) -> Result<()> {
    match action {
        FilterAction::Add {
            block_keyword,
            allow,
            targets,
        } => {
            let mut rule = FilterRule::new(block_keyword);
            rule.allow_keywords = allow;
            rule.target_title = targets.contains(&FilterTarget::Title);
            rule.target_description = targets.contains(&FilterTarget::Description);

            let id = ctx.filters.add(&rule)?;
            println!("Added filter [{id}] blocking \"{}\"", rule.block_keyword);
        }
        FilterAction::Remove { id } => {
            ctx.filters.remove(id)?;
            println!("Removed filter {id}");
        }
        FilterAction::List => {
            let rules = ctx.filters.list()?;
            if rules.is_empty() {
                println!("No filters");
                return Ok(());
            }
            for rule in rules {
                let mut targets = Vec::new();
                if rule.target_title {
                    targets.push("title");
                }
                if rule.target_description {
                    targets.push("description");
                }
                let exceptions = rule
                    .allow_keywords
                    .as_deref()
                    .map(|a| format!(", except \"{a}\""))
                    .unwrap_or_default();
                println!(
                    "[{}] block \"{}\" in {}{}",
                    rule.id,
                    rule.block_keyword,
                    targets.join("+"),
                    exceptions
                );
            }
        }
    }
    Ok(())
}

pub fn allow_command(ctx: &AppContext, action: AllowAction) -> Result<()> {
    match action {
        AllowAction::Add { keyword } => {
            let added = ctx.allow_keywords.add(&keyword)?;
            println!("Added allow keyword [{}] \"{}\"", added.id, added.keyword);
        }
        AllowAction::Remove { id } => {
            ctx.allow_keywords.remove(id)?;
            println!("Removed allow keyword {id}");
        }
        AllowAction::List => {
            let keywords = ctx.allow_keywords.list()?;
            if keywords.is_empty() {
                println!("No allow keywords");
                return Ok(());
            }
            for keyword in keywords {
                println!("[{}] {}", keyword.id, keyword.keyword);
            }
        }
    }
    Ok(())
}

pub fn prune(
    ctx: &AppContext,
    days: Option<u32>,
    include_starred: bool,
    dry_run: bool,
) -> Result<()> {
    let cutoff = match days {
        Some(n) => RetentionCutoff::OlderThanDays(n),
        None => RetentionCutoff::All,
    };

    let stats = ctx.store.retention_stats(cutoff, include_starred)?;
    if dry_run {
        println!(
            "Would delete {} articles ({} unread, {} read, {} starred)",
            stats.total, stats.unread, stats.read, stats.starred
        );
        return Ok(());
    }

    let deleted = ctx.store.delete_older_than(cutoff, include_starred)?;
    println!("Deleted {deleted} articles");
    Ok(())
}
