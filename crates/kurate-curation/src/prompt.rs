//! Prompt construction for listing rewrites.

use kurate_core::ProductCategory;

use crate::llm::ChatPrompt;

/// Raw supplier copy as scraped.
#[derive(Debug, Clone, Copy)]
pub struct RawProduct<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub price_text: &'a str,
}

/// Raw descriptions beyond this many characters are cut before prompting.
const MAX_RAW_DESCRIPTION_CHARS: usize = 4000;

/// Same inputs always give the same prompt.
#[must_use]
pub fn build_prompt(brand_name: &str, product: RawProduct<'_>) -> ChatPrompt {
    let categories = ProductCategory::ALL
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let system = format!(
        "You are the senior copywriter for {brand_name}, an independent online store with a \
         warm, understated voice. You rewrite raw supplier listings into original product copy.\n\
         Rules:\n\
         - Never mention the supplier, marketplace, shipping origin, or wholesale terms.\n\
         - Do not invent certifications, materials, or measurements that are not in the input.\n\
         - name: at most 80 characters, no keyword stuffing.\n\
         - description: 2 to 4 short paragraphs of plain text.\n\
         - shortDescription: one sentence, at most 160 characters.\n\
         - category: exactly one of: {categories}.\n\
         - suggestedPriceCents: retail price in US cents as a positive integer, typically \
           2.5x to 4x the supplier price.\n\
         Respond with a single JSON object with exactly these keys: \
         name, description, shortDescription, category, suggestedPriceCents. \
         No markdown, no commentary."
    );

    let description = if product.description.trim().is_empty() {
        "(none provided)".to_owned()
    } else {
        product
            .description
            .trim()
            .chars()
            .take(MAX_RAW_DESCRIPTION_CHARS)
            .collect()
    };
    let price = if product.price_text.trim().is_empty() {
        "(unknown)"
    } else {
        product.price_text.trim()
    };

    let user = format!(
        "Supplier title: {}\nSupplier price: {price}\nSupplier description:\n{description}",
        product.name.trim()
    );

    ChatPrompt { system, user }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> RawProduct<'static> {
        RawProduct {
            name: "2024 New Hot Sale Ceramic Mug Coffee Cup Free Shipping",
            description: "Material: ceramic. Capacity: 350ml.",
            price_text: "US $3.20",
        }
    }

    #[test]
    fn prompt_is_deterministic() {
        assert_eq!(build_prompt("Kurate", product()), build_prompt("Kurate", product()));
    }

    #[test]
    fn system_prompt_names_brand_and_every_category() {
        let prompt = build_prompt("Hearth & Co", product());
        assert!(prompt.system.contains("Hearth & Co"));
        for category in ProductCategory::ALL {
            assert!(prompt.system.contains(category.as_str()));
        }
        assert!(prompt.system.contains("suggestedPriceCents"));
    }

    #[test]
    fn user_prompt_carries_raw_fields() {
        let prompt = build_prompt("Kurate", product());
        assert!(prompt.user.contains("Ceramic Mug"));
        assert!(prompt.user.contains("US $3.20"));
        assert!(prompt.user.contains("350ml"));
    }

    #[test]
    fn blank_fields_get_placeholders() {
        let prompt = build_prompt(
            "Kurate",
            RawProduct {
                name: "Mug",
                description: "  ",
                price_text: "",
            },
        );
        assert!(prompt.user.contains("(none provided)"));
        assert!(prompt.user.contains("(unknown)"));
    }

    #[test]
    fn long_descriptions_are_cut() {
        let long = "x".repeat(MAX_RAW_DESCRIPTION_CHARS + 500);
        let prompt = build_prompt(
            "Kurate",
            RawProduct {
                name: "Mug",
                description: &long,
                price_text: "$1",
            },
        );
        assert!(prompt.user.len() < MAX_RAW_DESCRIPTION_CHARS + 200);
    }
}
