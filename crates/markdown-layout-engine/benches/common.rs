// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_markdown_content(size: usize) -> String {
    let base = "# Title\n\n## Section\n\nParagraph with *some* content and `code`.\n\n- Bullet point\n  - Nested item\n- [x] Done item\n\n```rust\nfn example() {\n    println!(\"Hello\");\n}\n```\n\n";
    base.repeat(size)
}

/// Content exercising every rewrite plugin: math, diagrams and details.
#[allow(dead_code)]
pub fn generate_extended_content(sections: usize) -> String {
    let mut content = String::new();
    for section in 0..sections {
        content.push_str(&format!("## Section {section}\n\n"));
        content.push_str("Energy is $E = mc^2$ and momentum is $p = mv$.\n\n");
        content.push_str("$$\n\\int_0^1 x^2 dx\n$$\n\n");
        content.push_str("```mermaid\ngraph TD\n  A-->B\n```\n\n");
        content.push_str("<details open>\n<summary>More</summary>\n\nHidden **body** text.\n</details>\n\n");
        content.push_str("| Name | Value |\n|------|------:|\n| a | 1 |\n| b | 22 |\n\n");
        content.push_str("> A quoted line with a [link](https://example.com).\n\n");
    }
    content
}

#[allow(dead_code)]
pub fn generate_large_document() -> String {
    let mut content = generate_markdown_content(100);
    content.push_str(&generate_extended_content(50));
    content
}
