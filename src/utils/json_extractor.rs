use regex::Regex;
use std::sync::LazyLock;

/// 匹配 ```json ... ``` 或 ``` ... ``` 代码块
static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?[ \t]*\r?\n?(.*?)```").expect("fenced block pattern")
});

/// 从LLM的自由文本回复中提取JSON对象
///
/// 依次尝试代码块内容与正文中每个完整配对的`{...}`，返回第一个能解析为JSON的候选。
/// 扫描时会跳过字符串字面量内的花括号与转义字符。
pub fn extract_json(text: &str) -> Option<&str> {
    for captures in FENCED_BLOCK.captures_iter(text) {
        if let Some(body) = captures.get(1)
            && let Some(object) = first_valid_object(body.as_str())
        {
            return Some(object);
        }
    }

    first_valid_object(text)
}

/// 找到第一个完整配对且是合法JSON的对象
///
/// `{customer}`这类正文里的占位符会被跳过。
fn first_valid_object(text: &str) -> Option<&str> {
    let mut search_from = 0;
    while let Some(offset) = text[search_from..].find('{') {
        let start = search_from + offset;
        if let Some(end) = matching_brace(&text[start..]) {
            let candidate = &text[start..start + end + 1];
            if serde_json::from_str::<serde_json::Value>(candidate).is_ok() {
                return Some(candidate);
            }
        }
        search_from = start + 1;
    }
    None
}

/// 返回与开头`{`配对的`}`的字节位置
fn matching_brace(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (index, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_object() {
        let text = r#"{"ensights": []}"#;
        assert_eq!(extract_json(text), Some(text));
    }

    #[test]
    fn test_object_surrounded_by_prose() {
        let text = r#"Here is the analysis you asked for:
{"ensights": [{"EnsightType": "final"}]}
Let me know if you need anything else."#;
        assert_eq!(
            extract_json(text),
            Some(r#"{"ensights": [{"EnsightType": "final"}]}"#)
        );
    }

    #[test]
    fn test_fenced_json_block() {
        let text = "Sure!\n```json\n{\"a\": {\"b\": 1}}\n```\nDone.";
        assert_eq!(extract_json(text), Some("{\"a\": {\"b\": 1}}"));
    }

    #[test]
    fn test_plain_fence_without_language() {
        let text = "```\n{\"a\": 1}\n```";
        assert_eq!(extract_json(text), Some("{\"a\": 1}"));
    }

    #[test]
    fn test_braces_inside_strings_are_ignored() {
        let text = r#"note {"Concerns": "customer typed } and { in chat", "x": "\"}"} trailing }"#;
        assert_eq!(
            extract_json(text),
            Some(r#"{"Concerns": "customer typed } and { in chat", "x": "\"}"}"#)
        );
    }

    #[test]
    fn test_unbalanced_prefix_is_skipped() {
        let text = r#"stray { opening then {"ok": true}"#;
        // 第一个`{`没有配对，继续向后寻找
        assert_eq!(extract_json(text), Some(r#"{"ok": true}"#));
    }

    #[test]
    fn test_prose_braces_before_payload_are_skipped() {
        let text = "Insights for {customer} below:\n{\"ensights\": [{\"EnsightType\": \"final\"}]}";
        assert_eq!(
            extract_json(text),
            Some(r#"{"ensights": [{"EnsightType": "final"}]}"#)
        );
    }

    #[test]
    fn test_non_json_fence_does_not_shadow_payload() {
        let text = "Template:\n```text\nHello {placeholder}\n```\nResult:\n{\"ok\": true}";
        assert_eq!(extract_json(text), Some(r#"{"ok": true}"#));
    }

    #[test]
    fn test_no_json() {
        assert_eq!(extract_json("I cannot help with that."), None);
        assert_eq!(extract_json("{ never closed"), None);
        assert_eq!(extract_json("only {placeholders} and {names} here"), None);
    }
}
