//! Prompt builders for question generation and answer feedback.

use std::fmt::Write;

use crate::question::QuestionRecord;
use crate::store::ScoredQuestion;

const GENERATION_RULES: &str = "\
The question should follow the same format but be different from the examples.
Make sure the question tests listening comprehension and has a clear correct answer.

Important rules:
1. The Introduction MUST explicitly state the key information needed to answer the Question
2. If the Question asks about specific details (like food, location, time), those EXACT details MUST be clearly mentioned in the Introduction
3. The correct answer should be directly stated or strongly implied in the Introduction
4. Keep the language level appropriate for French language learners
5. The Introduction should be written as a brief scenario description, not as dialogue
6. There MUST be exactly 4 options

Format Requirements:
Introduction: A paragraph providing detailed context and the necessary information to answer the question
Question: A specific question testing comprehension of the information in the introduction
Options:
1. first option
2. second option
3. third option
4. fourth option
";

const BAD_EXAMPLE: &str = "\
BAD EXAMPLE:
Introduction: Julie parle de son équipe de football préférée.
Question: Quelle équipe de football est l'équipe préférée de Julie?
Options:
1. Paris Saint-Germain
2. Olympique de Marseille
3. Manchester United
4. Real Madrid
WHY: the Introduction never names the team, so the answer cannot be heard.
";

const FEEDBACK_RULES: &str = "\
IMPORTANT VALIDATION RULES:
1. Carefully read the Situation to identify the EXACT correct answer
2. The correct answer MUST be explicitly stated or directly implied in the Situation text
3. Do NOT make assumptions - only use information directly provided in the text
4. The explanation must be in French and quote specific details from the Situation
5. The correct_answer must be a number between 1 and 4
6. The explanation should be encouraging even for incorrect answers

Reply with ONLY this JSON object:
{
\"correct\": boolean,
\"explanation\": \"clear explanation in French with specific references to the text\",
\"correct_answer\": number
}
";

fn push_options(out: &mut String, record: &QuestionRecord) {
    for (i, option) in record.options.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, option);
    }
}

/// Few-shot prompt asking for a new question about `topic`.
pub fn question_prompt(topic: &str, examples: &[ScoredQuestion]) -> String {
    let mut prompt = String::with_capacity(4096);
    let _ = writeln!(
        prompt,
        "Based on the following example French listening questions, create a new question about {topic}."
    );
    prompt.push_str(GENERATION_RULES);
    prompt.push_str("\nHere are some example French listening questions:\n\n");

    for (i, example) in examples.iter().enumerate() {
        let record = &example.record;
        let _ = writeln!(prompt, "Example {}:", i + 1);
        let _ = writeln!(prompt, "Introduction: {}", record.introduction);
        let _ = writeln!(prompt, "Question: {}", record.question);
        prompt.push_str("Options:\n");
        push_options(&mut prompt, record);
        prompt.push('\n');
    }

    prompt.push_str(BAD_EXAMPLE);
    prompt.push_str("\nReturn ONLY the new question without any additional text.\nNew Question:\n");
    prompt
}

/// Grading prompt for option `selected` (1-based) of `record`.
pub fn feedback_prompt(record: &QuestionRecord, selected: u8) -> String {
    let mut prompt = String::with_capacity(2048);
    prompt.push_str(
        "You are a French language assessment expert. Analyse this listening comprehension \
         question and give accurate feedback on the selected answer.\n\n",
    );
    let _ = writeln!(prompt, "Situation: {}", record.introduction);
    if let Some(conversation) = &record.conversation {
        let _ = writeln!(prompt, "Conversation: {conversation}");
    }
    let _ = writeln!(prompt, "Question: {}", record.question);
    prompt.push_str("Options:\n");
    push_options(&mut prompt, record);
    let _ = writeln!(prompt, "\nSelected Answer: {selected}\n");
    prompt.push_str(FEEDBACK_RULES);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> QuestionRecord {
        QuestionRecord {
            introduction: "Martin a 34 ans.".into(),
            conversation: None,
            question: "Quel âge a Martin?".into(),
            options: ["30".into(), "34".into(), "40".into(), "44".into()],
            answer: None,
        }
    }

    #[test]
    fn question_prompt_embeds_topic_and_examples() {
        let examples = vec![ScoredQuestion {
            id: "v_0".into(),
            record: record(),
            similarity_score: 0.2,
        }];
        let prompt = question_prompt("Sports", &examples);

        assert!(prompt.contains("create a new question about Sports"));
        assert!(prompt.contains("Example 1:"));
        assert!(prompt.contains("Introduction: Martin a 34 ans."));
        assert!(prompt.contains("2. 34"));
        assert!(prompt.contains("exactly 4 options"));
        assert!(prompt.ends_with("New Question:\n"));
    }

    #[test]
    fn feedback_prompt_numbers_options_and_selection() {
        let prompt = feedback_prompt(&record(), 2);

        assert!(prompt.contains("Situation: Martin a 34 ans."));
        assert!(prompt.contains("1. 30\n2. 34\n3. 40\n4. 44"));
        assert!(prompt.contains("Selected Answer: 2"));
        assert!(prompt.contains("\"correct_answer\": number"));
        assert!(!prompt.contains("Conversation:"));
    }
}
