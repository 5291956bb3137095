use std::path::Path;

use anyhow::{bail, Result};

use scrollfx_core::{AppConfig, RangeSpec, RenderSurface};

use crate::page::selector::Selector;
use crate::page::StaticPage;

/// Every selector the config refers to, labelled by where it came from
fn selectors(config: &AppConfig) -> Vec<(String, &str)> {
    let mut found = Vec::new();

    for (i, binding) in config.bindings.iter().enumerate() {
        found.push((format!("bindings[{}]", i), binding.selector.as_str()));
        if let Some(RangeSpec::Layout {
            container: Some(container),
        }) = &binding.range
        {
            found.push((format!("bindings[{}].range", i), container.as_str()));
        }
    }
    if let Some(progress) = &config.progress {
        found.push(("progress".to_string(), progress.selector.as_str()));
    }
    if let Some(steps) = &config.steps {
        found.push(("steps".to_string(), steps.selector.as_str()));
        found.push(("steps.fade".to_string(), steps.fade_selector.as_str()));
    }
    if let Some(reveal) = &config.reveal {
        found.push(("reveal".to_string(), reveal.selector.as_str()));
    }

    found
}

pub fn run(config: &AppConfig, page: Option<&Path>) -> Result<()> {
    config.validate()?;

    let selectors = selectors(config);
    let mut invalid = 0;
    for (origin, selector) in &selectors {
        if let Err(e) = Selector::parse(selector) {
            println!("  {}: {}", origin, e);
            invalid += 1;
        }
    }
    if invalid > 0 {
        bail!("{} invalid selector(s)", invalid);
    }

    println!(
        "Configuration OK: {} binding(s), {} selector(s)",
        config.bindings.len(),
        selectors.len()
    );

    if let Some(path) = page {
        let page = StaticPage::load(path)?;
        println!("\nMatches on {} ({} nodes):", path.display(), page.len());
        for (origin, selector) in &selectors {
            let matched = page.query_all(selector).len();
            let note = if matched == 0 { "  (no match)" } else { "" };
            println!("  {:<16} {:<24} {}{}", origin, selector, matched, note);
        }
    }

    Ok(())
}
