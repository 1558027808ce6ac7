use crate::question::QuestionRecord;

const RULES: &str = "\
Vous êtes un générateur de script audio pour des tests d'écoute en français. Formatez la question suivante pour la génération audio.

Règles:
1. Introduction et parties de Question:
   - Doivent commencer par 'Intervenant: Annonceur (Genre: male)'
   - Garder comme parties séparées
   - Marquer les sections avec \"Section: [Introduction/Conversation/Question]\" au début

2. Parties de conversation:
   - Nommer les intervenants selon leur rôle (Étudiant, Professeur, etc.)
   - Doit spécifier le genre EXACTEMENT comme 'Genre: male' ou 'Genre: female'
   - Utiliser des noms cohérents pour le même intervenant
   - Diviser les longs discours aux pauses naturelles

Formatez chaque partie EXACTEMENT comme ceci, sans variations:
Section: [Introduction/Conversation/Question]
Intervenant: [nom] (Genre: male)
Texte: [texte français]
---

Exemple de format:
Section: Introduction
Intervenant: Annonceur (Genre: male)
Texte: Écoutez la conversation suivante et répondez à la question.
---
Section: Conversation
Intervenant: Étudiant (Genre: female)
Texte: Excusez-moi, ce train s'arrête-t-il à la gare de Lyon?
---
Section: Question
Intervenant: Annonceur (Genre: male)
Texte: Où va le train?
---
";

/// Prompt asking the model to rewrite `record` as tagged speaker turns.
pub fn conversation_prompt(record: &QuestionRecord) -> String {
    let json = serde_json::to_string_pretty(record).unwrap_or_else(|e| {
        log::warn!("conversation: cannot serialise record as JSON ({e}), using plain text");
        record.document()
    });
    format!(
        "{RULES}\nQuestion à formater:\n{json}\n\n\
         Produisez UNIQUEMENT les parties formatées dans l'ordre: introduction, conversation, question.\n\
         Assurez-vous de spécifier le genre EXACTEMENT comme indiqué dans l'exemple.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeds_record_as_pretty_json() {
        let record = QuestionRecord {
            introduction: "Écoutez le dialogue.".into(),
            conversation: Some("Bonjour, Léa.".into()),
            question: "Qui parle?".into(),
            options: ["Léa".into(), "Paul".into(), "Anne".into(), "Luc".into()],
            answer: None,
        };
        let prompt = conversation_prompt(&record);

        assert!(prompt.contains("\"introduction\": \"Écoutez le dialogue.\""));
        assert!(prompt.contains("\"conversation\": \"Bonjour, Léa.\""));
        assert!(prompt.contains("Intervenant: Annonceur (Genre: male)"));
    }
}
