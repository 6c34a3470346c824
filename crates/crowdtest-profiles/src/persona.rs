//! Persona narrative generation.
//!
//! Turns a structured profile into a second-person character description that
//! a simulated customer can stay in character with. The order of the sections
//! is fixed; absent data simply drops its sentence.

use crowdtest_core::profile::CustomerProfile;

/// Render a profile as a persona narrative.
pub fn generate(profile: &CustomerProfile) -> String {
    let mut parts: Vec<String> = Vec::new();

    parts.push(format!(
        "You are {}, a {}-year-old {} living in {}.",
        profile.name, profile.age, profile.gender, profile.location
    ));

    if !profile.member_since.is_empty() {
        let year: String = profile.member_since.chars().take(4).collect();
        let tier = if profile.loyalty_tier.is_empty() {
            ".".to_string()
        } else {
            format!(" ({} tier).", profile.loyalty_tier)
        };
        parts.push(format!("You've been a loyalty member since {year}{tier}"));
    }

    let purchases = &profile.purchase_history;
    if !purchases.is_empty() {
        let total_items = purchases.len();
        let total_spent: f64 = purchases.iter().map(|p| p.price).sum();
        let avg_order = total_spent / total_items as f64;

        let categories = top_counts(purchases.iter().map(|p| p.category.clone()), 3);
        let cat_str = categories
            .iter()
            .map(|(cat, count)| format!("{cat} ({count})"))
            .collect::<Vec<_>>()
            .join(", ");

        let colors = top_counts(
            purchases
                .iter()
                .filter(|p| !p.color.is_empty())
                .map(|p| p.color.to_lowercase()),
            4,
        );

        parts.push(format!(
            "Over the past year, you've purchased {total_items} items totaling around \
             \u{20ac}{total_spent:.0}, with an average of \u{20ac}{avg_order:.0} per item."
        ));
        parts.push(format!("Your shopping leans toward: {cat_str}."));

        if !colors.is_empty() {
            let palette = colors
                .iter()
                .map(|(color, _)| color.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            parts.push(format!("Your wardrobe palette favors {palette}."));
        }

        let subcategories = unique_in_order(
            purchases
                .iter()
                .filter(|p| !p.subcategory.is_empty())
                .map(|p| p.subcategory.clone()),
            5,
        );
        if !subcategories.is_empty() {
            parts.push(format!(
                "Recent purchases include: {}.",
                subcategories.join(", ")
            ));
        }

        let returns: Vec<_> = purchases.iter().filter(|p| p.returned).collect();
        if !returns.is_empty() {
            let reason = returns
                .iter()
                .find_map(|r| r.return_reason.as_deref())
                .map(|reason| format!(" with reasons including: \"{reason}\""))
                .unwrap_or_default();
            parts.push(format!("You returned {} item(s){reason}.", returns.len()));
        }
    }

    let prefs = &profile.preferences;
    match prefs.price_sensitivity.as_str() {
        "high" => {
            parts.push("You're price-conscious and look for good value.".to_string());
            if prefs.sale_shopper {
                parts.push("You primarily shop during sales and promotions.".to_string());
            }
        }
        "low" => {
            parts.push(
                "Price is not your primary concern; you prioritize quality and fit.".to_string(),
            );
        }
        _ => {}
    }

    let browsing = &profile.browsing_behavior;
    if !browsing.categories_viewed.is_empty() {
        parts.push(format!(
            "You regularly browse {} sections.",
            join_first(&browsing.categories_viewed, 4)
        ));
    }
    if browsing.items_wishlisted > 0 {
        parts.push(format!(
            "You currently have {} items on your wishlist.",
            browsing.items_wishlisted
        ));
    }
    if !browsing.collections_browsed.is_empty() {
        parts.push(format!(
            "Collections that caught your eye: {}.",
            join_first(&browsing.collections_browsed, 3)
        ));
    }

    if !prefs.style.is_empty() {
        parts.push(format!(
            "Your style is best described as {}.",
            prefs.style.join(", ")
        ));
    }
    if !prefs.avoids.is_empty() {
        parts.push(format!("You tend to avoid {}.", join_first(&prefs.avoids, 3)));
    }
    if !prefs.preferred_fit.is_empty() {
        parts.push(format!("You prefer a {} fit.", prefs.preferred_fit));
    }
    if prefs.sustainability_interest {
        parts.push(
            "Sustainability matters to you; you look for eco-friendly materials and ethical \
             production."
                .to_string(),
        );
    }
    if !prefs.brand_affinity.is_empty() {
        parts.push(format!(
            "You also shop at {}.",
            join_first(&prefs.brand_affinity, 3)
        ));
    }

    // The customer's own words carry the voice; quote the first two entries.
    for item in profile.feedback_history.iter().take(2) {
        let sentence = match item.kind.as_str() {
            "review" => {
                let rating = item
                    .rating
                    .map(|r| format!(" (rated {r}/5)"))
                    .unwrap_or_default();
                format!("In a recent review{rating}, you said: \"{}\"", item.content)
            }
            "complaint" => format!("You once complained: \"{}\"", item.content),
            "survey" => format!("In a survey, you shared: \"{}\"", item.content),
            "support_ticket" => format!("You contacted support about: \"{}\"", item.content),
            _ => continue,
        };
        parts.push(sentence);
    }

    if !profile.segments.is_empty() {
        let readable = profile
            .segments
            .iter()
            .map(|s| s.replace('_', " "))
            .collect::<Vec<_>>()
            .join(", ");
        parts.push(format!("You'd best be categorized as a {readable} shopper."));
    }

    parts.join(" ")
}

/// Most frequent values, ties broken by first appearance.
fn top_counts(values: impl Iterator<Item = String>, limit: usize) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(existing, _)| *existing == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }
    // Stable sort keeps first-seen order among equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(limit);
    counts
}

fn unique_in_order(values: impl Iterator<Item = String>, limit: usize) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
        if seen.len() == limit {
            break;
        }
    }
    seen
}

fn join_first(values: &[String], limit: usize) -> String {
    values
        .iter()
        .take(limit)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
