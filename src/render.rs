//! Terminal rendering of session frames
//!
//! Pure functions of [`SessionView`]; nothing here touches session state.

use std::fmt::{Display, Write};

use crate::models::{CuisineCategory, Restaurant};
use crate::session::{LoadingState, SessionView};

const SKELETON_CARDS: usize = 3;

/// Render a full frame: category bar plus the body for the current state
#[must_use]
pub fn render(view: &SessionView<'_>) -> String {
    let mut out = String::new();
    out.push_str(&render_category_bar(view.category, view.controls_enabled));
    out.push('\n');

    match view.loading_state {
        LoadingState::Locating => {
            out.push_str("📍 Locating...\n");
            out.push_str("   Allow location access to find food nearby.\n");
        }
        LoadingState::Idle => {
            if let Some(location) = view.location {
                let _ = writeln!(out, "📍 Located at {}", location.format_coordinates());
            }
        }
        LoadingState::Searching => {
            let _ = writeln!(
                out,
                "🔎 AI is searching for the best \"{}\" restaurants...",
                view.category
            );
            out.push_str(&render_skeleton());
        }
        LoadingState::Error => {
            out.push_str("⚠️  Oops! Something went wrong\n");
            if let Some(message) = view.error_message {
                let _ = writeln!(out, "   {message}");
            }
            if view.failure.is_some_and(|failure| failure.is_location()) {
                out.push_str("   Allow location access, then press [r] to retry\n");
            } else {
                out.push_str("   [r] Retry\n");
            }
        }
        LoadingState::Success => {
            let _ = writeln!(out, "🔥 {} nearby  (AI picks)", view.category);
            if view.restaurants.is_empty() {
                let _ = writeln!(out, "\n🏚️  No {} restaurants found nearby.", view.category);
                if view.category != CuisineCategory::Recommended {
                    let _ = writeln!(
                        out,
                        "   Try \"{}\" instead.",
                        CuisineCategory::Recommended
                    );
                }
            } else {
                for restaurant in view.restaurants {
                    out.push('\n');
                    out.push_str(&RestaurantCard::new(restaurant).with_reviews(true).to_string());
                }
            }
        }
    }
    out
}

/// One line listing every category, the selected one bracketed
#[must_use]
pub fn render_category_bar(selected: CuisineCategory, enabled: bool) -> String {
    let labels: Vec<String> = CuisineCategory::ALL
        .iter()
        .map(|category| {
            if *category == selected {
                format!("[{category}]")
            } else {
                category.to_string()
            }
        })
        .collect();
    let suffix = if enabled { "" } else { "  (busy)" };
    format!("{}{suffix}\n", labels.join(" · "))
}

fn render_skeleton() -> String {
    let card = "   ░░░░░░░░░░░░░░░░░░        ░░░\n   ░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░\n   ░░░░░░░░░░░░░░░░░░░░░░░░░\n";
    (0..SKELETON_CARDS).map(|_| format!("\n{card}")).collect()
}

/// Five star slots for a review rating, rounded to whole stars.
/// Out-of-range and non-finite values are clamped.
#[must_use]
pub fn stars(rating: Option<f64>) -> String {
    let filled = match rating {
        Some(value) if value.is_finite() => value.round().clamp(0.0, 5.0) as usize,
        _ => 0,
    };
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

/// A restaurant rendered as a text card
pub struct RestaurantCard<'a> {
    restaurant: &'a Restaurant,
    show_reviews: bool,
}

impl<'a> RestaurantCard<'a> {
    #[must_use]
    pub fn new(restaurant: &'a Restaurant) -> Self {
        Self {
            restaurant,
            show_reviews: false,
        }
    }

    #[must_use]
    pub fn with_reviews(mut self, show_reviews: bool) -> Self {
        self.show_reviews = show_reviews;
        self
    }
}

impl Display for RestaurantCard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let r = self.restaurant;
        writeln!(f, "🍽️  {}  {}", r.name, r.display_price())?;
        if !r.cuisine.is_empty() {
            writeln!(f, "   {}", r.cuisine)?;
        }
        writeln!(
            f,
            "   ⭐ {}  ({}+ reviews)",
            r.display_rating(),
            r.display_review_count()
        )?;
        if !r.description.is_empty() {
            writeln!(f, "   {}", r.description)?;
        }
        if !r.address.is_empty() {
            writeln!(f, "   📍 {}", r.address)?;
        }
        if let Some(url) = &r.google_maps_url {
            writeln!(f, "   🗺️ Map: {url}")?;
        }

        match (&r.reservation_link, r.reservation_kind()) {
            (Some(link), Some(kind)) => writeln!(f, "   📅 {}: {link}", kind.label())?,
            _ => writeln!(f, "   🚫 No online booking")?,
        }

        if self.show_reviews {
            if r.reviews.is_empty() {
                writeln!(f, "   💬 No reviews yet")?;
            } else {
                writeln!(f, "   💬 Recent reviews")?;
                for review in &r.reviews {
                    writeln!(f, "      {} {}", stars(review.rating), review.author)?;
                    writeln!(f, "      \"{}\"", review.text)?;
                }
            }
        }
        Ok(())
    }
}
