//! Templates every store starts with.
//!
//! These exist in memory even when the persistence directory is empty or
//! missing. A persisted record with the same name replaces the built-in in
//! place.

use super::template::Template;

pub fn default_templates() -> Vec<Template> {
    vec![
        Template::new(
            "product_photography",
            "Professional product photography template",
            "professional product photography of {product}, studio lighting, white background, high detail, commercial quality, 8k",
        )
        .with_negative_prompt("blurry, low quality, amateur, distorted, dark")
        .with_style("realistic")
        .with_tags(["product", "commercial", "photography"])
        .with_parameter("guidance_scale", 8.0),
        Template::new(
            "landscape_art",
            "Beautiful landscape artwork template",
            "beautiful {landscape_type} landscape, {time_of_day}, dramatic lighting, detailed, artstation, concept art, smooth, sharp focus",
        )
        .with_negative_prompt("blurry, ugly, distorted, low quality")
        .with_style("artistic")
        .with_tags(["landscape", "nature", "art"])
        .with_parameter("guidance_scale", 7.5),
        Template::new(
            "portrait_professional",
            "Professional portrait photography template",
            "professional portrait photograph of {subject}, studio lighting, bokeh background, detailed face, high quality, 50mm lens, professional photography",
        )
        .with_negative_prompt("blurry, low quality, distorted, amateur, bad anatomy")
        .with_style("realistic")
        .with_tags(["portrait", "professional", "photography"])
        .with_parameter("guidance_scale", 7.0),
        Template::new(
            "social_media_post",
            "Eye-catching social media post template",
            "modern social media post design, {theme}, vibrant colors, professional, clean layout, trending style, high engagement",
        )
        .with_negative_prompt("cluttered, ugly, low quality, amateur")
        .with_style("graphic_design")
        .with_tags(["social_media", "marketing", "design"])
        .with_parameter("guidance_scale", 7.5),
        Template::new(
            "campaign_banner",
            "Marketing campaign banner template",
            "marketing campaign banner for {campaign_type}, {brand_style}, eye-catching, professional design, high impact, commercial quality",
        )
        .with_negative_prompt("cluttered, low quality, amateur, generic")
        .with_style("marketing")
        .with_tags(["campaign", "marketing", "banner"])
        .with_parameter("guidance_scale", 8.0),
        Template::new(
            "abstract_art",
            "Abstract artistic creation template",
            "abstract art, {color_scheme}, {mood}, flowing shapes, creative, unique, artstation quality",
        )
        .with_negative_prompt("realistic, photographic, boring, low quality")
        .with_style("abstract")
        .with_tags(["abstract", "art", "creative"])
        .with_parameter("guidance_scale", 7.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_unique_defaults() {
        let templates = default_templates();
        assert_eq!(templates.len(), 6);
        let mut names: Vec<&str> = templates.iter().map(|t| t.name.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 6);
    }

    #[test]
    fn default_placeholders_match_table() {
        let expected: &[(&str, &[&str])] = &[
            ("product_photography", &["product"]),
            ("landscape_art", &["landscape_type", "time_of_day"]),
            ("portrait_professional", &["subject"]),
            ("social_media_post", &["theme"]),
            ("campaign_banner", &["campaign_type", "brand_style"]),
            ("abstract_art", &["color_scheme", "mood"]),
        ];
        let templates = default_templates();
        for (name, keys) in expected {
            let t = templates.iter().find(|t| t.name == *name).unwrap();
            assert_eq!(t.placeholders(), *keys, "placeholders of {name}");
        }
    }

    #[test]
    fn every_default_round_trips() {
        for t in default_templates() {
            assert_eq!(Template::from_record(&t.to_record()).unwrap(), t);
        }
    }
}
