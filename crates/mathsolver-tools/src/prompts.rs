//! Prompt templates and tool descriptions

pub const WIKIPEDIA_NAME: &str = "Wikipedia";
pub const WIKIPEDIA_DESCRIPTION: &str =
    "A tool for searching the Internet to find various information on the topics mentioned";

pub const CALCULATOR_NAME: &str = "Calculator";
pub const CALCULATOR_DESCRIPTION: &str = "A tool for answering math-related questions. Only input mathematical expressions need to be provided";

pub const REASONING_NAME: &str = "Reasoning tool";
pub const REASONING_DESCRIPTION: &str =
    "A tool for answering logic-based and reasoning questions.";

/// Template for the reasoning tool; `{question}` is replaced with the input
pub const REASONING_TEMPLATE: &str = "You are an agent tasked with solving users' mathematical questions. Logically arrive at the solution and provide a detailed explanation and display it pointwise for the question below:
Question: {question}
Answer:";

/// Few-shot prompt that turns a word problem into a single expression
pub const MATH_PROMPT: &str = r#"Translate a math problem into a expression that can be evaluated by a calculator. Use the output of running this code to answer the question.

Question: ${Question with math problem.}
```text
${single line mathematical expression that solves the problem}
```
...evaluate(text)...
```output
${Output of running the code}
```
Answer: ${Answer}

Begin.

Question: What is 37593 * 67?
```text
37593 * 67
```
...evaluate("37593 * 67")...
```output
2518731
```
Answer: 2518731

Question: 37593^(1/5)
```text
37593**(1/5)
```
...evaluate("37593**(1/5)")...
```output
8.222831614237718
```
Answer: 8.222831614237718

Question: {question}
"#;

/// Fill a `{question}` template
pub fn render(template: &str, question: &str) -> String {
    template.replace("{question}", question)
}
