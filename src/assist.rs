//! Single-dispatch text helpers outside the bulk pipeline.
//!
//! IPA suggestion and sentence glossing are one-shot free-text requests: no
//! chunking, no response contract, no merge. They share the injected
//! transport with the bulk operations; a transport failure surfaces as an
//! error instead of a sentinel string, so callers decide how to report it.
use crate::op::prompt;
use crate::transport::{GenerativeService, ServiceRequest, TransportError};

/// Ask for the most likely transcription of one word under a phonology
/// description. The service is instructed to answer with only the IPA string
/// in forward slashes; the reply is trimmed, not validated.
pub fn suggest_ipa(
    service: &dyn GenerativeService,
    word: &str,
    phonology: &str,
) -> Result<String, TransportError> {
    let request = ServiceRequest {
        prompt: prompt::ipa_prompt(word, phonology),
        schema_hint: None,
        model: None,
    };
    Ok(service.generate(&request)?.trim().to_string())
}

/// Ask for a gloss and syntax analysis of one sentence against free-text
/// grammar notes. The reply is prose and passed through verbatim.
pub fn analyze_syntax(
    service: &dyn GenerativeService,
    sentence: &str,
    grammar: &str,
) -> Result<String, TransportError> {
    let request = ServiceRequest {
        prompt: prompt::gloss_prompt(sentence, grammar),
        schema_hint: None,
        model: None,
    };
    Ok(service.generate(&request)?.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct Canned {
        response: &'static str,
        prompts: RefCell<Vec<String>>,
    }

    impl Canned {
        fn new(response: &'static str) -> Self {
            Self {
                response,
                prompts: RefCell::new(Vec::new()),
            }
        }
    }

    impl GenerativeService for Canned {
        fn generate(&self, request: &ServiceRequest) -> Result<String, TransportError> {
            self.prompts.borrow_mut().push(request.prompt.clone());
            Ok(self.response.to_string())
        }
    }

    struct Down;

    impl GenerativeService for Down {
        fn generate(&self, _request: &ServiceRequest) -> Result<String, TransportError> {
            Err(TransportError::new("connection refused"))
        }
    }

    #[test]
    fn ipa_suggestion_trims_the_reply_and_sends_no_schema_hint() {
        struct NoHint;
        impl GenerativeService for NoHint {
            fn generate(&self, request: &ServiceRequest) -> Result<String, TransportError> {
                assert!(request.schema_hint.is_none());
                Ok("  /ˈka.va/\n".to_string())
            }
        }
        let ipa = suggest_ipa(&NoHint, "kava", "open syllables").unwrap();
        assert_eq!(ipa, "/ˈka.va/");
    }

    #[test]
    fn gloss_prompt_carries_sentence_and_grammar() {
        let service = Canned::new("kava-PST eat-3SG");
        let gloss = analyze_syntax(&service, "kava ate", "SOV, suffixing").unwrap();
        assert_eq!(gloss, "kava-PST eat-3SG");
        let prompts = service.prompts.borrow();
        assert!(prompts[0].contains("\"kava ate\""));
        assert!(prompts[0].contains("SOV, suffixing"));
    }

    #[test]
    fn transport_failure_is_an_error_not_a_sentinel() {
        assert!(suggest_ipa(&Down, "kava", "any").is_err());
        assert!(analyze_syntax(&Down, "kava ate", "any").is_err());
    }
}
