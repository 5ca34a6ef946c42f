use sitios_entities::types::ColorScheme;

/// Generate the tenant stylesheet from its color scheme. Everything else in
/// the public markup hangs off these custom properties.
pub fn theme_css(scheme: &ColorScheme) -> String {
    format!(
        ":root {{\n  \
         --color-primary: {primary};\n  \
         --color-secondary: {secondary};\n  \
         --color-accent: {accent};\n  \
         --color-background: {background};\n  \
         --color-text: {text};\n\
         }}\n\n\
         body {{\n  \
         margin: 0;\n  \
         font-family: system-ui, sans-serif;\n  \
         background: var(--color-background);\n  \
         color: var(--color-text);\n\
         }}\n\n\
         a {{ color: var(--color-primary); }}\n\
         .site-header {{ background: var(--color-primary); color: var(--color-secondary); }}\n\
         .site-nav a {{ color: var(--color-secondary); }}\n\
         .accent {{ color: var(--color-accent); }}\n",
        primary = scheme.primary,
        secondary = scheme.secondary,
        accent = scheme.accent,
        background = scheme.background,
        text = scheme.text,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_custom_properties() {
        let css = theme_css(&ColorScheme::default());
        assert!(css.contains("--color-primary: #1a5632;"));
        assert!(css.contains("--color-accent: #d4a017;"));
    }
}
