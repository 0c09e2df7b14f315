//! Property-based tests for the confirmation gate.

#[cfg(test)]
mod tests {
    use crate::config::PromptConfig;
    use crate::safety::{ConfirmationGate, INVALID_ANSWER_WARNING, is_affirmative, is_valid_answer};
    use crate::test_utils::ScriptedPromptHandler;
    use crate::types::BucketConfig;
    use proptest::prelude::*;

    fn gate(handler: &ScriptedPromptHandler) -> ConfirmationGate {
        ConfirmationGate::with_prompt_handler(PromptConfig::default(), Box::new(handler.clone()))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Any valid answer not starting with "y" declines the bucket.
        #[test]
        fn non_y_answers_decline(suffix in "[a-z ]{0,8}", lead in "[a-xzA-XZ]") {
            let answer = format!("{lead}{suffix} no");
            let handler = ScriptedPromptHandler::new(&[&answer]);

            prop_assert!(!gate(&handler).confirm(&BucketConfig::new("b", true)));
            prop_assert!(handler.warnings().is_empty());
        }

        /// Any valid answer starting with "y" or "Y" confirms.
        #[test]
        fn y_answers_confirm(lead in "[yY]", rest in "[a-z ]{0,8}") {
            let answer = format!("{lead}{rest}yes");
            let handler = ScriptedPromptHandler::new(&[&answer]);

            prop_assert!(gate(&handler).confirm(&BucketConfig::new("b", true)));
        }

        /// Invalid answers are never accepted; each one produces a warning.
        #[test]
        fn invalid_answers_are_reprompted(invalid in prop::collection::vec("[a-dfh-mp-xz]{0,6}", 1..5)) {
            let mut answers: Vec<&str> = invalid.iter().map(String::as_str).collect();
            answers.push("yes");
            let handler = ScriptedPromptHandler::new(&answers);

            prop_assert!(gate(&handler).confirm(&BucketConfig::new("b", true)));
            prop_assert_eq!(handler.questions().len(), invalid.len() + 1);
            prop_assert_eq!(handler.warnings(), vec![INVALID_ANSWER_WARNING.to_string(); invalid.len()]);
        }

        /// The question always names the bucket.
        #[test]
        fn question_names_bucket(bucket in "[a-z0-9][a-z0-9-]{1,20}[a-z0-9]") {
            let handler = ScriptedPromptHandler::default();
            let question = gate(&handler).question(&bucket);

            let expected_fragment = format!("Make {bucket} empty.");
            prop_assert!(question.contains(&expected_fragment));
            prop_assert!(question.ends_with("[yes/no]:"));
        }

        #[test]
        fn affirmative_implies_leading_y(answer in ".{0,12}") {
            if is_affirmative(&answer) {
                prop_assert!(answer.trim().to_ascii_lowercase().starts_with('y'));
            }
        }

        #[test]
        fn validity_ignores_case(answer in "[a-zA-Z ]{0,12}") {
            prop_assert_eq!(is_valid_answer(&answer), is_valid_answer(&answer.to_uppercase()));
        }
    }
}
