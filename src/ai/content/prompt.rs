//! Prompt builders for articles and multi-file projects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// 記事の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContentType {
    #[default]
    BlogPost,
    TechnicalArticle,
    Tutorial,
    NewsArticle,
    Review,
    OpinionPiece,
    HowToGuide,
    CaseStudy,
    ProductDocumentation,
    ApiDocumentation,
    WhitePaper,
    ResearchPaper,
    MarketingCopy,
}

impl ContentType {
    pub const ALL: [ContentType; 13] = [
        ContentType::BlogPost,
        ContentType::TechnicalArticle,
        ContentType::Tutorial,
        ContentType::NewsArticle,
        ContentType::Review,
        ContentType::OpinionPiece,
        ContentType::HowToGuide,
        ContentType::CaseStudy,
        ContentType::ProductDocumentation,
        ContentType::ApiDocumentation,
        ContentType::WhitePaper,
        ContentType::ResearchPaper,
        ContentType::MarketingCopy,
    ];

    /// 表示名
    pub fn label(&self) -> &'static str {
        match self {
            ContentType::BlogPost => "Blog Post",
            ContentType::TechnicalArticle => "Technical Article",
            ContentType::Tutorial => "Tutorial",
            ContentType::NewsArticle => "News Article",
            ContentType::Review => "Review",
            ContentType::OpinionPiece => "Opinion Piece",
            ContentType::HowToGuide => "How-to Guide",
            ContentType::CaseStudy => "Case Study",
            ContentType::ProductDocumentation => "Product Documentation",
            ContentType::ApiDocumentation => "API Documentation",
            ContentType::WhitePaper => "White Paper",
            ContentType::ResearchPaper => "Research Paper",
            ContentType::MarketingCopy => "Marketing Copy",
        }
    }

    /// 種類ごとの追加指示
    fn guidance(&self) -> &'static str {
        match self {
            ContentType::BlogPost => {
                "Make it engaging, conversational, and shareable. Use relatable analogies. \
                 Focus on a strong hook and clear takeaways."
            }
            ContentType::Tutorial | ContentType::HowToGuide => {
                "Provide clear, step-by-step instructions. Include necessary prerequisites, \
                 detailed code examples (if applicable), and practical troubleshooting tips. \
                 The content should be highly actionable and easy to follow."
            }
            ContentType::TechnicalArticle => {
                "Dive deep into the technical aspects. Use precise terminology, comprehensive \
                 explanations of concepts, and detailed code/configuration examples. \
                 Assume a knowledgeable audience."
            }
            ContentType::Review => {
                "Analyze the product/service comprehensively. Include a clear introduction, \
                 detailed pros and cons, target audience analysis, pricing insights (if applicable), \
                 and a clear recommendation or rating (e.g., '4.5/5 Stars')."
            }
            ContentType::NewsArticle => {
                "Report on a recent event or development. Follow journalistic principles: who, what, \
                 when, where, why, and how. Maintain an objective, informative tone. \
                 Include a clear headline and summary."
            }
            ContentType::CaseStudy => {
                "Detail a specific problem, the solution implemented, and the measurable results achieved. \
                 Focus on data, methodology, and quantifiable outcomes. \
                 Structure as: Introduction, Problem, Solution, Results, Conclusion."
            }
            ContentType::ProductDocumentation | ContentType::ApiDocumentation => {
                "Provide clear, concise, and accurate instructions for using a product or API. \
                 Include installation, usage examples, parameter descriptions, and error handling. \
                 Organize content logically for easy navigation."
            }
            _ => "",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ContentType {
    type Err = Error;

    /// "Blog Post", "blog-post", "blog_post" をすべて受け付ける
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_label(s);
        ContentType::ALL
            .into_iter()
            .find(|t| normalize_label(t.label()) == wanted)
            .ok_or_else(|| Error::Config(format!("unknown content type: {}", s)))
    }
}

fn normalize_label(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// 記事生成リクエスト
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRequest {
    pub topic: String,
    pub content_type: ContentType,
    /// ユーザーからの特記事項
    pub description: String,
    pub additional_requirements: String,
    pub writing_style: String,
    pub target_audience: String,
    /// 目標語数（例: "800-1200"）
    pub word_count: String,
    pub include_seo: bool,
    pub include_toc: bool,
    pub include_examples: bool,
    pub include_conclusion: bool,
}

impl ArticleRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            content_type: ContentType::BlogPost,
            description: String::new(),
            additional_requirements: String::new(),
            writing_style: "Professional".to_string(),
            target_audience: "General Public".to_string(),
            word_count: "800-1200".to_string(),
            include_seo: true,
            include_toc: false,
            include_examples: true,
            include_conclusion: true,
        }
    }

    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_requirements(mut self, requirements: impl Into<String>) -> Self {
        self.additional_requirements = requirements.into();
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.writing_style = style.into();
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.target_audience = audience.into();
        self
    }

    pub fn with_word_count(mut self, word_count: impl Into<String>) -> Self {
        self.word_count = word_count.into();
        self
    }

    pub fn with_toc(mut self, include: bool) -> Self {
        self.include_toc = include;
        self
    }

    pub fn with_seo(mut self, include: bool) -> Self {
        self.include_seo = include;
        self
    }

    pub fn with_examples(mut self, include: bool) -> Self {
        self.include_examples = include;
        self
    }

    pub fn with_conclusion(mut self, include: bool) -> Self {
        self.include_conclusion = include;
        self
    }

    /// LLMプロンプトに変換
    pub fn to_prompt(&self) -> String {
        let mut sections = Vec::new();

        if self.include_seo {
            sections.push(
                "SEO Requirements:\n\
                 - Include an engaging, keyword-rich title at the top (H1).\n\
                 - Use proper header hierarchy (H1, H2, H3, etc.).\n\
                 - Include relevant keywords naturally throughout the text.\n\
                 - Add a meta description-worthy introduction (first paragraph).\n\
                 - Ensure a strong conclusion with key takeaways.",
            );
        }
        if self.include_toc {
            sections.push(
                "Table of Contents:\n\
                 - Generate a Table of Contents (TOC) at the beginning of the article, linking to main H2 sections.",
            );
        }
        if self.include_examples {
            sections.push(
                "Examples and Practicality:\n\
                 - Incorporate practical examples, code snippets (if applicable), or real-world scenarios to illustrate concepts.\n\
                 - Ensure all code blocks are properly formatted with language identifiers (e.g., ```python).",
            );
        }
        if self.include_conclusion {
            sections.push(
                "Conclusion:\n\
                 - Provide a concise summary of key points.\n\
                 - Offer actionable next steps or final thoughts.",
            );
        }

        let kind = self.content_type.label();
        let mut prompt = format!(
            "Create a comprehensive and engaging {} about \"{}\".\n\n",
            kind.to_lowercase(),
            self.topic
        );

        prompt.push_str("Content Specifications:\n");
        prompt.push_str(&format!("- Content Type: {}\n", kind));
        prompt.push_str(&format!("- Topic: {}\n", self.topic));
        prompt.push_str(&format!("- Writing Style: {}\n", self.writing_style));
        prompt.push_str(&format!("- Target Audience: {}\n", self.target_audience));
        prompt.push_str(&format!(
            "- Word Count Target: Approximately {} words\n\n",
            self.word_count
        ));

        prompt.push_str(&format!(
            "Special Requirements from User:\n{}\n\n",
            self.description
        ));
        prompt.push_str(&format!(
            "Additional Instructions from User:\n{}\n\n",
            self.additional_requirements
        ));

        prompt.push_str("---\nFormatting and Structural Guidelines:\n");
        for section in &sections {
            prompt.push_str(section);
            prompt.push_str("\n\n");
        }

        let guidance = self.content_type.guidance();
        if !guidance.is_empty() {
            prompt.push_str(&format!("Type-Specific Guidance:\n{}\n\n", guidance));
        }

        prompt.push_str(
            "General Structure Requirements:\n\
             1. **Title**: Create an engaging, descriptive title (use # for H1)\n\
             2. **Introduction**: Hook the reader and outline what they'll learn (first paragraph).\n\
             3. **Main Content**: Use proper heading hierarchy (##, ###) for sections.\n\
             4. **Code Examples**: Use proper markdown code blocks with language specification (e.g., ```python).\n\
             5. **Lists**: Use bullet points or numbered lists where appropriate.\n\
             6. **Tables**: Create tables when comparing data or features (if relevant).\n\
             7. **Quotes/Callouts**: Use > for important quotes or callouts.\n\
             8. **Links**: Include relevant links (use placeholder URLs like https://example.com).\n\n\
             Content Quality Standards:\n\
             - Make it informative and actionable.\n\
             - Ensure accuracy and up-to-date information.\n\
             - Make it engaging and easy to read.\n\
             - Include troubleshooting tips where relevant (especially for tutorials).\n\
             - Add best practices and common pitfalls to avoid.\n\n\
             Please create content that is publication-ready and professionally formatted in Markdown.\n",
        );

        prompt
    }
}

/// プロジェクト生成リクエスト
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRequest {
    pub project_name: String,
    /// 例: "Python Project", "CLI Tool"
    pub project_type: String,
    pub description: String,
    pub additional_requirements: String,
    pub target_audience: String,
    pub complexity: String,
    pub include_tests: bool,
    pub include_docker: bool,
    pub include_ci_cd: bool,
    pub include_docs: bool,
    pub create_examples: bool,
}

impl ProjectRequest {
    pub fn new(project_name: impl Into<String>, project_type: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            project_type: project_type.into(),
            description: String::new(),
            additional_requirements: String::new(),
            target_audience: "Developers".to_string(),
            complexity: "Intermediate".to_string(),
            include_tests: false,
            include_docker: false,
            include_ci_cd: false,
            include_docs: true,
            create_examples: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_requirements(mut self, requirements: impl Into<String>) -> Self {
        self.additional_requirements = requirements.into();
        self
    }

    pub fn with_complexity(mut self, complexity: impl Into<String>) -> Self {
        self.complexity = complexity.into();
        self
    }

    pub fn with_tests(mut self, include: bool) -> Self {
        self.include_tests = include;
        self
    }

    pub fn with_docker(mut self, include: bool) -> Self {
        self.include_docker = include;
        self
    }

    pub fn with_ci_cd(mut self, include: bool) -> Self {
        self.include_ci_cd = include;
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.target_audience = audience.into();
        self
    }

    pub fn with_docs(mut self, include: bool) -> Self {
        self.include_docs = include;
        self
    }

    pub fn with_examples(mut self, include: bool) -> Self {
        self.create_examples = include;
        self
    }

    /// LLMプロンプトに変換
    pub fn to_prompt(&self) -> String {
        let kind = self.project_type.to_lowercase();
        let mut requirements = vec![
            "Create a main Python file with complete, working code.".to_string(),
            "Include `requirements.txt` with all necessary dependencies.".to_string(),
            "Create a comprehensive `README.md` with setup instructions, usage, and project overview."
                .to_string(),
            "Add a `.gitignore` file for Python projects.".to_string(),
        ];
        if self.include_tests {
            requirements.push(
                "Include unit tests for key functionalities (e.g., using unittest or pytest).".to_string(),
            );
        }
        if self.include_docker {
            requirements.push(
                "Provide a Dockerfile and docker-compose.yml for containerization.".to_string(),
            );
        }
        if self.include_ci_cd {
            requirements.push(
                "Add a basic CI/CD configuration (e.g., GitHub Actions workflow).".to_string(),
            );
        }
        if self.include_docs {
            requirements.push(
                "Ensure inline comments and docstrings are comprehensive. Create a separate `docs/` folder for additional documentation if needed."
                    .to_string(),
            );
        }
        if self.create_examples {
            requirements.push(
                "Include example usage or test files (e.g., `example.py`).".to_string(),
            );
        }
        requirements.push(
            "Add configuration files if needed (e.g., `config.py`, `.env.example`).".to_string(),
        );

        let mut prompt = format!(
            "Create a complete {} called \"{}\".\n\n",
            kind, self.project_name
        );
        prompt.push_str("Project Specifications:\n");
        prompt.push_str(&format!("- Project Name: {}\n", self.project_name));
        prompt.push_str(&format!("- Project Type: {}\n", self.project_type));
        prompt.push_str(&format!("- Target Audience: {}\n", self.target_audience));
        prompt.push_str(&format!("- Complexity Level: {}\n", self.complexity));
        prompt.push_str(&format!("- Description: {}\n", self.description));
        prompt.push_str(&format!(
            "- Additional Requirements: {}\n\n",
            self.additional_requirements
        ));

        prompt.push_str(
            "Please create a complete project structure with multiple files. Format your response as follows:\n\n\
             FILE: filename.ext\n\
             ```language\n\
             [file content here]\n\
             ```\n\n\
             FILE: another_file.ext\n\
             ```language\n\
             [file content here]\n\
             ```\n\n\
             Requirements:\n",
        );
        for (i, requirement) in requirements.iter().enumerate() {
            prompt.push_str(&format!("{}. {}\n", i + 1, requirement));
        }

        prompt.push_str(
            "\nMake sure all code is:\n\
             - Production-ready and well-commented.\n\
             - Follows best practices for the chosen language/framework.\n\
             - Includes proper error handling.\n\
             - Has clear documentation.\n\
             - Is ready to run after setup.\n\n",
        );
        prompt.push_str(&format!(
            "Focus on creating a {} that is practical and useful.\n",
            kind
        ));

        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_parsing() {
        assert_eq!(
            "How-to Guide".parse::<ContentType>().unwrap(),
            ContentType::HowToGuide
        );
        assert_eq!(
            "api-documentation".parse::<ContentType>().unwrap(),
            ContentType::ApiDocumentation
        );
        assert!("poem".parse::<ContentType>().is_err());
    }

    #[test]
    fn test_article_prompt_toggles() {
        let prompt = ArticleRequest::new("Rust ownership")
            .with_content_type(ContentType::Tutorial)
            .with_toc(true)
            .with_seo(false)
            .to_prompt();

        assert!(prompt.contains("Create a comprehensive and engaging tutorial about \"Rust ownership\""));
        assert!(prompt.contains("Table of Contents:"));
        assert!(!prompt.contains("SEO Requirements:"));
        assert!(prompt.contains("step-by-step instructions"));
    }

    #[test]
    fn test_article_prompt_without_guidance() {
        let prompt = ArticleRequest::new("Ethics of AI")
            .with_content_type(ContentType::OpinionPiece)
            .to_prompt();
        assert!(!prompt.contains("Type-Specific Guidance:"));
        assert!(prompt.contains("- Content Type: Opinion Piece"));
    }

    #[test]
    fn test_project_prompt_numbering() {
        let prompt = ProjectRequest::new("Todo API", "API Project")
            .with_tests(true)
            .with_docker(true)
            .to_prompt();

        assert!(prompt.contains("FILE: filename.ext"));
        assert!(prompt.contains("5. Include unit tests"));
        assert!(prompt.contains("6. Provide a Dockerfile"));
        assert!(prompt.contains("Focus on creating a api project"));
    }

    #[test]
    fn test_project_docs_examples_and_audience() {
        let default_prompt = ProjectRequest::new("Todo API", "API Project").to_prompt();
        assert!(default_prompt.contains("- Target Audience: Developers"));
        assert!(default_prompt.contains("`docs/` folder"));
        assert!(default_prompt.contains("`example.py`"));

        let prompt = ProjectRequest::new("Todo API", "API Project")
            .with_audience("Data scientists")
            .with_docs(false)
            .with_examples(false)
            .to_prompt();
        assert!(prompt.contains("- Target Audience: Data scientists"));
        assert!(!prompt.contains("`docs/` folder"));
        assert!(!prompt.contains("`example.py`"));
        assert!(prompt.contains("5. Add configuration files"));
    }
}
