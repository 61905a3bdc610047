// SPDX-License-Identifier: Apache-2.0

//! Placeholder substitution over kernel skeleton text.
//!
//! The generators specialize numbered per-lane fragments by substituting
//! `<%...%>` placeholders before concatenating the fragments into a fixed
//! skeleton. Substitution never mutates its input, and a placeholder that
//! does not occur leaves the text unchanged.

/// Replace the first occurrence of `placeholder` in `template`.
pub fn replace_first(template: &str, placeholder: &str, value: &str) -> String {
    template.replacen(placeholder, value, 1)
}

/// Replace every occurrence of `placeholder` in `template`.
pub fn replace_all(template: &str, placeholder: &str, value: &str) -> String {
    template.replace(placeholder, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_placeholder_is_a_no_op() {
        let template = "float mean = 0.0f;\n";
        assert_eq!(replace_first(template, "<%NUM%>", "3"), template);
        assert_eq!(replace_all(template, "<%NUM%>", "3"), template);
    }

    #[test]
    fn replace_first_leaves_later_occurrences() {
        let out = replace_first("a<%N%>b<%N%>", "<%N%>", "0");
        assert_eq!(out, "a0b<%N%>");
    }

    #[test]
    fn replace_all_covers_every_occurrence() {
        let out = replace_all("mean<%N%> += delta / counter<%N%>;", "<%N%>", "2");
        assert_eq!(out, "mean2 += delta / counter2;");
    }

    #[test]
    fn unrelated_text_is_untouched() {
        let template = "const unsigned int dm<%N%> = <%N%>; // <%OTHER%>";
        let out = replace_all(template, "<%N%>", "7");
        assert_eq!(out, "const unsigned int dm7 = 7; // <%OTHER%>");
    }
}
