//! プロンプト組み立て（リクエスト + メモリ → 次のプロンプト）

use crate::domain::{GenerationMemory, GenerationRequest, RequestKind, RequestedDifficulty};

const FRAMING: &str = "You are an expert English language teacher creating vocabulary lesson.";
const DEFAULT_PERSONA_THEME: &str = "Professional and Personal Development";
const DEFAULT_FREE_TEXT_CONTEXT: &str = "General Vocabulary";
const PING_COUNT: usize = 2;

/// 1 バッチで要求する件数
pub fn requested_count(request: &GenerationRequest, remaining_count: usize) -> usize {
    request.batch_size().min(remaining_count)
}

fn difficulty_lines(difficulty: RequestedDifficulty) -> (String, &'static str) {
    match difficulty {
        RequestedDifficulty::Tier(tier) => (
            format!(
                "- Each word should be appropriate for {} level",
                tier.as_str()
            ),
            tier.as_str(),
        ),
        RequestedDifficulty::Progressive => (
            "- Progress from Beginner to Professional: spread the words across Beginner, Intermediate, Advanced and Professional".to_string(),
            "Beginner",
        ),
    }
}

fn format_block(example_difficulty: &str, language: &str) -> String {
    format!(
        r#"IMPORTANT: Respond with ONLY a valid JSON array.

Format:
[
  {{
    "word": "example",
    "definition": "clear definition",
    "example": "practical sentence",
    "pronunciation": "/ɪɡˈzæmpəl/",
    "category": "category name",
    "difficulty": "{example_difficulty}",
    "localizedMeaning": "{language} meaning"
  }}
]"#
    )
}

fn critical_requirements(count: usize) -> String {
    format!(
        "CRITICAL REQUIREMENTS:
1. Start your response with [ and end with ]
2. Each object must have ALL 7 fields: word, definition, example, pronunciation, category, difficulty, localizedMeaning
3. \"difficulty\" must be exactly one of: Beginner, Intermediate, Advanced, Professional
4. All string values must be properly quoted
5. No trailing commas
6. No extra text or explanations
7. Generate exactly {count} words"
    )
}

fn exclusion_block(memory: &GenerationMemory) -> Option<String> {
    let words: Vec<&str> = memory.headwords().collect();
    if words.is_empty() {
        return None;
    }
    Some(format!(
        "IMPORTANT: Previously generated words (DO NOT REPEAT): {}",
        words.join(", ")
    ))
}

/// 次のバッチ用のプロンプトを組み立てる。件数は min(batch_size, remaining_count)。
pub fn compose(
    request: &GenerationRequest,
    memory: &GenerationMemory,
    batch_number: usize,
    remaining_count: usize,
) -> String {
    let count = requested_count(request, remaining_count);
    let language = request.meaning_language();
    let (difficulty_line, example_difficulty) = difficulty_lines(request.difficulty());
    let audience = match request.difficulty() {
        RequestedDifficulty::Tier(tier) => {
            format!("a {} level student", tier.as_str().to_lowercase())
        }
        RequestedDifficulty::Progressive => {
            "a student progressing from beginner to professional level".to_string()
        }
    };

    let mut sections: Vec<String> = vec![
        FRAMING.to_string(),
        format!(
            "Generate {count} English vocabulary words for {audience}. Based on the given content, generate relevant vocabulary that is useful for the given input."
        ),
    ];

    let relevance = match request.kind() {
        RequestKind::Persona {
            occupation,
            interests,
            theme,
        } => {
            sections.push(format!(
                "Context:\n- Occupation: {}\n- Interests/Habits: {}\n- Theme: {}",
                occupation,
                interests,
                theme.as_deref().unwrap_or(DEFAULT_PERSONA_THEME)
            ));
            format!("- Include words relevant to their work as {}", occupation)
        }
        RequestKind::FreeText { prompt, context } => {
            sections.push(format!(
                "User request:\n{}\n\nContext: {}",
                prompt.trim(),
                context.as_deref().unwrap_or(DEFAULT_FREE_TEXT_CONTEXT)
            ));
            "- Include words directly related to the user request".to_string()
        }
    };

    sections.push(format!(
        "Requirements:\n{difficulty_line}\n{relevance}\n- Provide clear, concise definitions\n- Create practical, real-world examples\n- Include IPA pronunciation\n- Categorize each word appropriately\n- Include the {language} meaning in localizedMeaning"
    ));

    if let Some(exclusion) = exclusion_block(memory) {
        sections.push(exclusion);
    }
    sections.push(format!(
        "Batch {batch_number}: Generate exactly {count} unique vocabulary words. Avoid all previously mentioned words."
    ));
    sections.push(format_block(example_difficulty, language));
    sections.push(critical_requirements(count));
    sections.push("Your response should be ONLY the JSON array, nothing else.".to_string());

    sections.join("\n\n")
}

/// 接続テスト用のプロンプト（2 語だけ要求する）
pub fn ping_prompt() -> String {
    [
        FRAMING.to_string(),
        format_block("Beginner", "Traditional Chinese"),
        critical_requirements(PING_COUNT),
        "Your response should be ONLY the JSON array, nothing else.".to_string(),
    ]
    .join("\n\n")
}
