//! String helpers for chat and names

/// Remove Minecraft formatting codes (`§` followed by one code character)
pub fn strip_color_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(ch) = chars.next() {
        if ch == '§' {
            chars.next();
        } else {
            result.push(ch);
        }
    }

    result
}

/// "dark_oak_planks" -> "Dark Oak Planks"
pub fn humanize_name(name: &str) -> String {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_color_codes() {
        assert_eq!(strip_color_codes("§aGreen§r Text"), "Green Text");
        assert_eq!(strip_color_codes("§6§lBold gold"), "Bold gold");
        assert_eq!(strip_color_codes("plain"), "plain");
        assert_eq!(strip_color_codes("trailing§"), "trailing");
    }

    #[test]
    fn test_humanize_name() {
        assert_eq!(humanize_name("dark_oak_planks"), "Dark Oak Planks");
        assert_eq!(humanize_name("stick"), "Stick");
        assert_eq!(humanize_name(""), "");
    }
}
