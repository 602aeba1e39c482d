//! Evaluation prompt construction.
//!
//! The template is deterministic: the same request always produces the same
//! prompt. The model is instructed to answer in exactly the two-line
//! `Score:` / `Reason:` format that [`super::parse`] recognizes.

use std::fmt::Write;

/// Builds the grading prompt for one request.
pub fn build_prompt(question: Option<&str>, reference_answer: &str, student_answer: &str) -> String {
    let mut prompt = String::from(
        "You are an expert educational evaluator. Evaluate the student's answer based on \
         conceptual understanding and provide a percentage score.\n\n\
         CRITICAL: If the student's answer is completely unrelated to the question topic or \
         shows no understanding, give 0% immediately.\n\n",
    );

    if let Some(question) = question {
        let _ = writeln!(prompt, "Question: {question}");
    }
    let _ = writeln!(prompt, "Student Answer: {student_answer}");
    let _ = writeln!(prompt, "Reference Answer: {reference_answer}");

    prompt.push_str(
        "\nEVALUATION CRITERIA:\n\
         1. Conceptual Accuracy (40%): Core concepts correctly identified and explained\n\
         2. Completeness (30%): Addresses key points from reference answer\n\
         3. Depth & Coverage (15%): Sufficient detail and comprehensive coverage\n\
         4. Clarity & Communication (15%): Clear, well-organized explanation\n\n\
         SCORING GUIDELINES:\n\
         - 90-100%: Excellent understanding, comprehensive coverage\n\
         - 80-89%: Strong understanding, addresses most key points\n\
         - 70-79%: Good understanding, covers main concepts\n\
         - 60-69%: Adequate understanding, partial coverage\n\
         - 50-59%: Basic understanding, significant gaps\n\
         - 40-49%: Limited understanding, major gaps\n\
         - 30-39%: Poor understanding, minimal knowledge\n\
         - 20-29%: Very poor understanding, mostly incorrect\n\
         - 10-19%: Minimal understanding, mostly wrong\n\
         - 0-9%: No understanding, completely incorrect or unrelated\n\n\
         EVALUATION RULES:\n\
         - Focus on CONCEPTUAL UNDERSTANDING, not exact wording\n\
         - Accept equivalent concepts expressed differently\n\
         - Reward comprehensive coverage even if details differ\n\
         - Give 0% for answers showing no understanding of the topic\n\
         - Give 0% for completely unrelated or nonsensical answers\n\
         - Be fair but strict - partial credit only for actual understanding\n\n\
         REQUIRED FORMAT:\n\
         Score: [percentage from 0% to 100%]\n\
         Reason: [Brief explanation of the student's understanding level and what they got \
         right or wrong]\n\n\
         Now evaluate:",
    );

    prompt
}
