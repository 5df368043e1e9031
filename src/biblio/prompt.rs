//! Few-shot conversation builder for reference classification.
//!
//! The example answers are kept exactly as the prompt was tuned, single
//! quotes and the unbalanced brace of the second answer included.

use serde::Serialize;

use crate::llm::{Message, Role};

use super::row::ReferenceRow;

const SYSTEM_PROMPT: &str = r#"The user will give you an abstract and a title of a scientific article.
Your job is to determine the Object of Analysis, Methodology, Scale of Analysis, Country and whether it's a Policy or an Educational Pratice.
Finally, it should include a Classification 1, 2, 3, or 4 where:
1) Elabora uma revisão da literatura/mapeamento sobre determinado assunto para identificar evidências para informar políticas ou práticas educativas.
2) Examina se determinada política ou prática é informada pela evidência científica.
3) Analisa importância do conhecimento científico na formação ou prática de professores.
4) Reflete sobre a avaliação de programas/iniciativas para informar políticas e práticas
The answer should be in Portuguese and structured as a JSON."#;

/// Title of the first worked example.
pub const EXAMPLE_HONG_KONG_TITLE: &str = "Implementation Matters: Teachers' Pedagogical Practices during the Implementation of an Interdisciplinary Curriculum in Hong Kong";

/// Abstract of the first worked example.
pub const EXAMPLE_HONG_KONG_ABSTRACT: &str = "An interdisciplinary subject, liberal studies, was introduced as a compulsory and core subject into the New Senior Secondary Curriculum in Hong Kong in 2009 with the purpose of expanding students' knowledge base and increasing their social awareness through investigation into a variety of issues. However, transforming curricular innovations into real classroom settings and maintaining them is a complicated process. This study aimed to investigate, during its first round of implementation, teachers' pedagogical practices in 21 local schools through in-depth interviews and documentary analysis. The results reveal that the school administrators and teachers were more likely to adapt their teaching approaches and teaching materials than their teaching content and assessment. Both good practices and examination-oriented practices in the process of curriculum implementation were evident in this study. These findings contribute to our understanding of the implementation of an interdisciplinary curriculum in examination-oriented systems and inform the practitioners of school-based practices of curriculum implementation.";

const EXAMPLE_HONG_KONG_ANSWER: &str = r#""
{'Objeto de Análise': 'Prática educacional',
'Metodologia': 'Entrevistas',
'Escala de Análise': 'Local',
'País': 'Hong Kong',
'Política/ prática': 'Prática',
'Classificação': 4
}"#;

const EXAMPLE_AUSTRALIA_TITLE: &str =
    "Professional Experience: Learning from the Past to Build the Future";

const EXAMPLE_AUSTRALIA_ABSTRACT: &str = r#"The title of the 2014 Australian Teacher Education Association (ATEA) conference was "Teacher Education, An Audit: Building a platform for future engagement." One of the conference themes was "Professional Experience: What works? Why?" I seized upon this theme and the title of the conference as it afforded me an opportunity to do an audit of my research in professional experience over the last 25Â years. This article presents this evidence base and the messages I have taken from this evidence. I have done this in the hope that, by collating some of the insights gained from the past and the present, it will help to "build a platform for future engagement" in professional experience. In preparing this article I was asked by the Editors to reflect also on how I developed my distinctive line of inquiry and expertise in relation to the practicum across an extended period. These reflections are included. I hope they will support university-based teacher educators in enhancing their satisfaction and achievements from working in this stimulating and provocative field of study."#;

const EXAMPLE_AUSTRALIA_ANSWER: &str = r#""
{'Objeto de Análise': 'Formação de professores',
'Metodologia': 'Não Especificado',
'Escala de Análise': 'Não Especificado',
'País': 'Australia',
'Política/ prática': 'Prática',
'Classificação': 3"#;

/// Ordered messages sent to the model for one reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Conversation(Vec<Message>);

impl Conversation {
    pub fn messages(&self) -> &[Message] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The dynamic user message for the row.
    pub fn last(&self) -> Option<&Message> {
        self.0.last()
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.0
    }
}

/// Fixed instruction plus two worked examples, shared by every request.
pub fn few_shot_prefix() -> Vec<Message> {
    let hong_kong = ReferenceRow::new(EXAMPLE_HONG_KONG_TITLE, EXAMPLE_HONG_KONG_ABSTRACT);
    let australia = ReferenceRow::new(EXAMPLE_AUSTRALIA_TITLE, EXAMPLE_AUSTRALIA_ABSTRACT);
    vec![
        Message::system(SYSTEM_PROMPT),
        Message::user(hong_kong.to_process()),
        Message::assistant(EXAMPLE_HONG_KONG_ANSWER),
        Message::user(australia.to_process()),
        Message::assistant(EXAMPLE_AUSTRALIA_ANSWER),
    ]
}

/// Conversation for one reference: the few-shot prefix, then the row itself.
pub fn build(row: &ReferenceRow) -> Conversation {
    let mut messages = few_shot_prefix();
    messages.push(Message {
        role: Role::User,
        content: row.to_process(),
    });
    Conversation(messages)
}
