//! Keyword-based skill extractor.
//!
//! No LLM involved — word-boundary regex matching against a curated
//! vocabulary. Multi-word entries match as phrases, not their constituent
//! words. Out-of-vocabulary synonyms are misses by design; there is no
//! fuzzy matching, so the same input always yields the same set.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

/// Canonical lowercase skill tokens. `BTreeSet` keeps iteration order
/// deterministic for scoring and display.
pub type SkillSet = BTreeSet<String>;

/// Curated skill vocabulary. Multi-word entries are matched as phrases;
/// single-word entries as whole words.
const VOCABULARY: &[&str] = &[
    // --- Languages ---
    "python", "c++", "c#", "java", "javascript", "typescript", "scala",
    "rust", "go", "golang", "r", "matlab", "julia", "kotlin", "swift",
    // --- ML / DL frameworks ---
    "pytorch", "tensorflow", "keras", "jax", "paddle",
    "scikit-learn", "sklearn", "xgboost", "lightgbm", "catboost",
    // --- Computer vision ---
    "opencv", "pillow", "albumentations", "timm",
    "yolo", "yolov5", "yolov8", "yolov11",
    "detectron2", "mmdetection", "torchvision",
    "object detection", "instance segmentation", "semantic segmentation",
    "pose estimation", "keypoint estimation", "object tracking",
    "image classification", "2d reconstruction", "3d reconstruction",
    "depth estimation", "optical flow",
    // --- NLP / LLM ---
    "transformers", "hugging face", "huggingface", "bert", "gpt",
    "llm", "large language model", "rag", "retrieval augmented generation",
    "langchain", "llamaindex", "llama index",
    "embeddings", "vector search", "semantic search",
    "text generation", "summarization", "question answering",
    // --- Agentic AI ---
    "multi-agent", "tool use", "function calling", "react agent",
    "langgraph", "autogen", "crewai", "agentic",
    // --- MLOps / experimentation ---
    "mlflow", "wandb", "weights and biases", "dvc", "neptune",
    "airflow", "kubeflow", "sagemaker", "vertex ai",
    // --- Optimisation / inference ---
    "onnx", "openvino", "tensorrt", "tflite", "coreml",
    "quantization", "pruning", "distillation",
    "latency-aware inference", "edge deployment",
    // --- Containerisation / DevOps ---
    "docker", "kubernetes", "k8s", "helm", "terraform",
    "ci/cd", "github actions", "gitlab ci", "jenkins",
    "microservices", "rest api", "grpc", "graphql",
    // --- Cloud ---
    "aws", "azure", "gcp", "google cloud",
    "ec2", "s3", "lambda", "cloud functions",
    // --- Vector / databases ---
    "qdrant", "pinecone", "weaviate", "chroma", "milvus", "faiss",
    "postgresql", "mysql", "mongodb", "redis", "elasticsearch",
    // --- Data engineering ---
    "spark", "kafka", "dbt", "pandas", "numpy", "pyspark",
    "data pipeline", "etl", "feature engineering",
    // --- Web / API ---
    "fastapi", "flask", "django", "uvicorn",
    // --- Research domains ---
    "tomography", "computational geometry", "signal processing",
    "inverse problems", "computed tomography",
    "ultrasound", "x-ray", "medical imaging",
    // --- General AI / ML ---
    "computer vision", "machine learning", "deep learning",
    "neural network", "cnn", "rnn", "lstm", "transformer",
    "attention mechanism", "transfer learning", "fine-tuning",
    "reinforcement learning", "self-supervised learning",
    // --- Soft / leadership ---
    "leadership", "mentoring", "research", "collaboration",
    "technical planning", "system design",
];

struct CompiledVocabulary {
    /// Phrases (containing space, hyphen, or slash) — matched first so
    /// longer matches win over their constituent words.
    multi_word: Vec<(&'static str, Regex)>,
    single_word: Vec<(&'static str, Regex)>,
}

static PATTERNS: Lazy<CompiledVocabulary> = Lazy::new(|| {
    let compile = |skill: &str| {
        Regex::new(&format!(r"(?i)\b{}\b", regex::escape(skill)))
            .expect("valid skill pattern")
    };
    let is_phrase = |s: &str| s.contains(' ') || s.contains('-') || s.contains('/');

    CompiledVocabulary {
        multi_word: VOCABULARY
            .iter()
            .filter(|s| is_phrase(s))
            .map(|&s| (s, compile(s)))
            .collect(),
        single_word: VOCABULARY
            .iter()
            .filter(|s| !is_phrase(s))
            .map(|&s| (s, compile(s)))
            .collect(),
    }
});

/// Return the set of vocabulary skills found in `text`.
///
/// Whitespace is collapsed first so multi-word skills are not broken by PDF
/// extraction artefacts like `machine\n \nlearning`.
pub fn extract_skills(text: &str) -> SkillSet {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut found = SkillSet::new();
    for (skill, pattern) in PATTERNS
        .multi_word
        .iter()
        .chain(PATTERNS.single_word.iter())
    {
        if pattern.is_match(&collapsed) {
            found.insert(skill.to_lowercase());
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> SkillSet {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_basic_extraction() {
        let skills =
            extract_skills("Senior engineer with Python, SQL pipelines and Docker deployments");
        assert!(skills.contains("python"));
        assert!(skills.contains("docker"));
    }

    #[test]
    fn test_case_insensitive() {
        let skills = extract_skills("KUBERNETES and PyTorch and TensorFlow");
        assert_eq!(set(&["kubernetes", "pytorch", "tensorflow"]), skills);
    }

    #[test]
    fn test_multi_word_phrase_matches_as_unit() {
        let skills = extract_skills("Expert in machine learning systems");
        assert!(skills.contains("machine learning"));
        // "learning" alone is not a vocabulary entry
        assert!(!skills.contains("learning"));
    }

    #[test]
    fn test_phrase_survives_pdf_newline_artefacts() {
        let skills = extract_skills("machine\n \nlearning and deep\nlearning");
        assert!(skills.contains("machine learning"));
        assert!(skills.contains("deep learning"));
    }

    #[test]
    fn test_token_boundary_no_substring_matches() {
        // "rust" must not match inside "frustrated"; "go" not inside "google"
        let skills = extract_skills("frustrated googler");
        assert!(!skills.contains("rust"));
        assert!(!skills.contains("go"));
    }

    #[test]
    fn test_out_of_vocabulary_synonym_is_a_miss() {
        // "tf" is a common shorthand for tensorflow but not in the vocabulary
        let skills = extract_skills("deployed tf models");
        assert!(!skills.contains("tensorflow"));
    }

    #[test]
    fn test_empty_input() {
        assert!(extract_skills("").is_empty());
    }

    #[test]
    fn test_deterministic() {
        let text = "Python, Rust, Kafka, deep learning, ci/cd pipelines";
        assert_eq!(extract_skills(text), extract_skills(text));
    }

    #[test]
    fn test_vocabulary_compiles_and_is_nonempty() {
        assert!(PATTERNS.multi_word.len() + PATTERNS.single_word.len() >= 140);
        assert!(!PATTERNS.multi_word.is_empty());
    }
}
