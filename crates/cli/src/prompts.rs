//! Instructions sent to the generator alongside the codebase context.

/// Instruction for a multi-file change, describing the `FILE:` block format
pub fn multi_file_instruction(task: &str) -> String {
    format!(
        "You are a coding assistant helping with a change across multiple files.

Task description: {task}

For each file that needs to be modified or created, specify:
1. The file path, relative to the project root
2. The complete new content for that file

Format your response like this:

FILE: path/to/file1
```python
# New content for file1
```

FILE: path/to/file2
```python
# New content for file2
```

Only include files that need to be changed. Do not include any explanations outside of the file blocks.
"
    )
}

/// Instruction for rewriting one file
pub fn single_file_instruction(path: &str, task: &str) -> String {
    format!("Modify the file {path} to: {task}. Return only the complete new file content.")
}

/// Instruction for generating a test file for `content` with `framework`
pub fn test_instruction(framework: &str, content: &str) -> String {
    format!(
        "Generate comprehensive unit tests for the following file using {framework}.
The tests should cover all functions and edge cases.
Return only the test code without explanations.

File to test:
```
{content}
```

Existing codebase context is available for reference."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use context_changes::parse_change_set;

    #[test]
    fn single_file_wording() {
        assert_eq!(
            single_file_instruction("src/app.py", "add logging"),
            "Modify the file src/app.py to: add logging. Return only the complete new file content."
        );
    }

    #[test]
    fn test_instruction_embeds_the_source() {
        let text = test_instruction("pytest", "def add(a, b):\n    return a + b");
        assert!(text.starts_with(
            "Generate comprehensive unit tests for the following file using pytest."
        ));
        assert!(text.contains("```\ndef add(a, b):\n    return a + b\n```"));
    }

    #[test]
    fn multi_file_example_follows_block_format() {
        let text = multi_file_instruction("rename foo");
        assert!(text.contains("Task description: rename foo"));
        let example = parse_change_set(&text);
        assert_eq!(example.paths(), vec!["path/to/file1", "path/to/file2"]);
    }
}
