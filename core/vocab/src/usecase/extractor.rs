//! 応答テキストから型なしレコード列を取り出す
//!
//! 形式の崩れた応答にも耐えるよう、成功するまで次の順で試す:
//! 1. 最初の `[` から最後の `]` を JSON 配列として解釈
//! 2. コードフェンス除去・末尾カンマ削除・裸のキーの引用・文字列内の改行エスケープをしてから再解釈
//! 3. 最初の `{` から最後の `}` を見出し語付きの単一オブジェクトとして解釈
//! 4. 見出し語キーを含む `{...}` を 1 つずつ拾って解釈
//! 5. フィールドごとの正規表現で値を集め、添字で組み立てる（欠けは既定値で埋める）
//!
//! どの段階も失敗しなければ空列を返す。エラーにはしない。

use crate::domain::RawRecord;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// どの段階で取り出せたか（ログ用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractStrategy {
    DirectArray,
    Repaired,
    SingleObject,
    Scavenged,
    FieldByField,
}

impl ExtractStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DirectArray => "direct_array",
            Self::Repaired => "repaired",
            Self::SingleObject => "single_object",
            Self::Scavenged => "scavenged",
            Self::FieldByField => "field_by_field",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub records: Vec<RawRecord>,
    /// None は全段階で何も取れなかったことを表す
    pub strategy: Option<ExtractStrategy>,
}

const HEADWORD_KEYS: &[&str] = &["word", "headword"];

const PLACEHOLDER_PRONUNCIATION: &str = "/prəˌnʌnsiˈeɪʃən/";
const PLACEHOLDER_CATEGORY: &str = "General";
const PLACEHOLDER_DIFFICULTY: &str = "Beginner";
const PLACEHOLDER_LOCALIZED: &str = "繁體中文翻譯未提供";

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"```[A-Za-z]*").expect("static regex"))
}

fn scavenge_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\{[^{}]*"(?:word|headword)"[^{}]*\}"#).expect("static regex")
    })
}

/// フィールドごとの正規表現（キー名の別名込み、大文字小文字を区別しない）
fn field_res() -> &'static [Regex; 7] {
    static RES: OnceLock<[Regex; 7]> = OnceLock::new();
    RES.get_or_init(|| {
        let build = |alias: &str| {
            Regex::new(&format!(
                r#"(?i)"(?:{})"\s*:\s*"((?:[^"\\]|\\.)*)""#,
                alias
            ))
            .expect("static regex")
        };
        [
            build("word|headword"),
            build("definition"),
            build("example"),
            build("pronunciation"),
            build("category"),
            build("difficulty|difficulty_?tier"),
            build("traditional_?chinese|localized_?meaning|translation"),
        ]
    })
}

/// 応答テキストからレコード列を取り出し、成功した段階も返す。失敗はしない（空の列になる）。
pub fn extract_with_strategy(raw_text: &str) -> Extraction {
    let attempts: [(ExtractStrategy, fn(&str) -> Vec<RawRecord>); 5] = [
        (ExtractStrategy::DirectArray, direct_array),
        (ExtractStrategy::Repaired, repaired_array),
        (ExtractStrategy::SingleObject, single_object),
        (ExtractStrategy::Scavenged, scavenge_objects),
        (ExtractStrategy::FieldByField, field_by_field),
    ];
    for (strategy, attempt) in attempts {
        let records = attempt(raw_text);
        if !records.is_empty() {
            return Extraction {
                records,
                strategy: Some(strategy),
            };
        }
    }
    Extraction {
        records: Vec::new(),
        strategy: None,
    }
}

/// 最初の open から最後の close までを切り出す
fn outer_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

fn objects_of(value: Value) -> Vec<RawRecord> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn parse_array(text: &str) -> Vec<RawRecord> {
    outer_span(text, '[', ']')
        .and_then(|span| serde_json::from_str::<Value>(span).ok())
        .map(objects_of)
        .unwrap_or_default()
}

fn direct_array(text: &str) -> Vec<RawRecord> {
    parse_array(text)
}

fn repaired_array(text: &str) -> Vec<RawRecord> {
    parse_array(&repair_json(&strip_fences(text)))
}

fn has_headword(map: &RawRecord) -> bool {
    map.keys()
        .any(|k| HEADWORD_KEYS.contains(&k.to_lowercase().as_str()))
}

fn single_object(text: &str) -> Vec<RawRecord> {
    let repaired = repair_json(&strip_fences(text));
    outer_span(&repaired, '{', '}')
        .and_then(|span| serde_json::from_str::<Value>(span).ok())
        .and_then(|v| match v {
            Value::Object(map) if has_headword(&map) => Some(vec![map]),
            _ => None,
        })
        .unwrap_or_default()
}

fn scavenge_objects(text: &str) -> Vec<RawRecord> {
    let stripped = strip_fences(text);
    scavenge_re()
        .find_iter(&stripped)
        .filter_map(|m| serde_json::from_str::<Value>(&repair_json(m.as_str())).ok())
        .filter_map(|v| match v {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect()
}

/// JSON 文字列リテラルの中身を元の文字列に戻す。不正なエスケープはそのまま使う。
fn unescape(captured: &str) -> String {
    serde_json::from_str::<String>(&format!("\"{}\"", captured))
        .unwrap_or_else(|_| captured.to_string())
}

fn field_by_field(text: &str) -> Vec<RawRecord> {
    let columns: Vec<Vec<String>> = field_res()
        .iter()
        .map(|re| {
            re.captures_iter(text)
                .filter_map(|c| c.get(1))
                .map(|m| unescape(m.as_str()))
                .collect()
        })
        .collect();
    let words = &columns[0];
    if words.is_empty() {
        return Vec::new();
    }
    let rows = columns.iter().map(Vec::len).max().unwrap_or(0);
    let pick = |col: usize, i: usize| -> Option<String> {
        columns[col].get(i).filter(|s| !s.trim().is_empty()).cloned()
    };

    (0..rows)
        .map(|i| {
            let word = pick(0, i);
            let subject = word.clone().unwrap_or_else(|| format!("word {}", i + 1));
            let mut map = RawRecord::new();
            let mut put = |key: &str, value: String| {
                map.insert(key.to_string(), Value::String(value));
            };
            put("word", word.unwrap_or_else(|| format!("Word {}", i + 1)));
            put(
                "definition",
                pick(1, i).unwrap_or_else(|| format!("Definition for {}", subject)),
            );
            put(
                "example",
                pick(2, i).unwrap_or_else(|| format!("Example sentence for {}", subject)),
            );
            put(
                "pronunciation",
                pick(3, i).unwrap_or_else(|| PLACEHOLDER_PRONUNCIATION.to_string()),
            );
            put(
                "category",
                pick(4, i).unwrap_or_else(|| PLACEHOLDER_CATEGORY.to_string()),
            );
            put(
                "difficulty",
                pick(5, i).unwrap_or_else(|| PLACEHOLDER_DIFFICULTY.to_string()),
            );
            put(
                "traditionalChinese",
                pick(6, i).unwrap_or_else(|| PLACEHOLDER_LOCALIZED.to_string()),
            );
            map
        })
        .collect()
}

/// マークダウンのコードフェンス記号を取り除く
pub fn strip_fences(text: &str) -> String {
    fence_re().replace_all(text, "").into_owned()
}

/// よくある崩れを直す。文字列リテラルの内外を追跡しながら 1 パスで処理する。
/// - `}` / `]` 直前の末尾カンマを削除
/// - `{` / `,` の直後にある裸のキーを引用符で囲む
/// - 文字列内の生の改行・復帰・タブをエスケープ
pub fn repair_json(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 16);
    let mut in_string = false;
    let mut escaped = false;
    let mut expect_key = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if in_string {
            match c {
                _ if escaped => {
                    escaped = false;
                    out.push(c);
                }
                '\\' => {
                    escaped = true;
                    out.push(c);
                }
                '"' => {
                    in_string = false;
                    out.push(c);
                }
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                _ => out.push(c),
            }
            i += 1;
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                expect_key = false;
                out.push(c);
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
                // 末尾カンマは出力しない
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(c);
                    expect_key = true;
                }
            }
            '{' => {
                out.push(c);
                expect_key = true;
            }
            _ if c.is_whitespace() => out.push(c),
            _ if expect_key && (c.is_ascii_alphabetic() || c == '_') => {
                let start = i;
                let mut end = i;
                while end < chars.len() && (chars[end].is_ascii_alphanumeric() || chars[end] == '_')
                {
                    end += 1;
                }
                let ident: String = chars[start..end].iter().collect();
                let colon_follows = chars[end..]
                    .iter()
                    .find(|ch| !ch.is_whitespace())
                    .map_or(false, |ch| *ch == ':');
                if colon_follows {
                    out.push('"');
                    out.push_str(&ident);
                    out.push('"');
                } else {
                    out.push_str(&ident);
                }
                expect_key = false;
                i = end;
                continue;
            }
            _ => {
                expect_key = false;
                out.push(c);
            }
        }
        i += 1;
    }
    out
}
