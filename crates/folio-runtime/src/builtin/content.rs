//! Static portfolio content the built-in tools read from.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub id: &'static str,
    pub title: &'static str,
    pub summary: &'static str,
    pub technologies: &'static [&'static str],
    pub featured: bool,
    pub open_source: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillGroup {
    pub category: &'static str,
    pub skills: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
pub struct Position {
    pub company: &'static str,
    pub role: &'static str,
    pub start: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<&'static str>,
    pub highlights: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
pub struct Education {
    pub institution: &'static str,
    pub degree: &'static str,
    pub year: u16,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactInfo {
    pub email: &'static str,
    pub location: &'static str,
    pub availability: &'static str,
    pub social: &'static [(&'static str, &'static str)],
}

/// Downloadable resume files, by format.
pub const RESUME_FILES: [(&str, &str); 2] = [("pdf", "/files/resume.pdf"), ("docx", "/files/resume.docx")];

pub const SKILL_CATEGORIES: [&str; 5] = ["languages", "frameworks", "databases", "cloud", "tools"];

pub static PROJECTS: [Project; 6] = [
    Project {
        id: "edge-cache",
        title: "Edge Cache",
        summary: "A sharded in-memory cache with TTL eviction and a gRPC front end.",
        technologies: &["rust", "tokio", "grpc"],
        featured: true,
        open_source: true,
        repository: Some("https://github.com/example/edge-cache"),
    },
    Project {
        id: "portfolio-assistant",
        title: "Portfolio Assistant",
        summary: "A chat assistant that navigates this site and answers questions about it.",
        technologies: &["typescript", "react", "rust"],
        featured: true,
        open_source: false,
        repository: None,
    },
    Project {
        id: "metrics-pipeline",
        title: "Metrics Pipeline",
        summary: "Streaming ingestion of service metrics into a columnar store.",
        technologies: &["go", "kafka", "clickhouse"],
        featured: true,
        open_source: false,
        repository: None,
    },
    Project {
        id: "schema-lint",
        title: "Schema Lint",
        summary: "A linter for JSON Schema documents with editor integration.",
        technologies: &["typescript", "node"],
        featured: false,
        open_source: true,
        repository: Some("https://github.com/example/schema-lint"),
    },
    Project {
        id: "infra-templates",
        title: "Infra Templates",
        summary: "Reusable Terraform modules for small production deployments.",
        technologies: &["terraform", "aws"],
        featured: false,
        open_source: true,
        repository: Some("https://github.com/example/infra-templates"),
    },
    Project {
        id: "budget-app",
        title: "Budget App",
        summary: "A mobile-first budgeting app with offline sync.",
        technologies: &["react", "postgresql", "python"],
        featured: false,
        open_source: false,
        repository: None,
    },
];

pub static SKILLS: [SkillGroup; 5] = [
    SkillGroup {
        category: "languages",
        skills: &["Rust", "TypeScript", "Go", "Python", "SQL"],
    },
    SkillGroup {
        category: "frameworks",
        skills: &["Tokio", "React", "Axum", "Next.js"],
    },
    SkillGroup {
        category: "databases",
        skills: &["PostgreSQL", "SQLite", "ClickHouse", "Redis"],
    },
    SkillGroup {
        category: "cloud",
        skills: &["AWS", "Terraform", "Kubernetes"],
    },
    SkillGroup {
        category: "tools",
        skills: &["Git", "Docker", "GitHub Actions"],
    },
];

pub static EXPERIENCE: [Position; 3] = [
    Position {
        company: "Northwind Systems",
        role: "Senior Software Engineer",
        start: "2021-03",
        end: None,
        highlights: &[
            "Led the rewrite of the ingestion service in Rust",
            "Cut p99 latency of the public API by 60%",
        ],
    },
    Position {
        company: "Brightline Labs",
        role: "Software Engineer",
        start: "2018-06",
        end: Some("2021-02"),
        highlights: &[
            "Built the customer dashboard in React",
            "Owned the billing integration",
        ],
    },
    Position {
        company: "Open Source",
        role: "Maintainer",
        start: "2016-01",
        end: None,
        highlights: &["Maintains schema-lint and edge-cache"],
    },
];

pub static EDUCATION: [Education; 1] = [Education {
    institution: "State University",
    degree: "B.Sc. Computer Science",
    year: 2018,
}];

pub static CONTACT: ContactInfo = ContactInfo {
    email: "hello@example.com",
    location: "Remote",
    availability: "Open to new opportunities",
    social: &[
        ("github", "https://github.com/example"),
        ("linkedin", "https://www.linkedin.com/in/example"),
    ],
};

pub fn resume_file(format: &str) -> Option<&'static str> {
    RESUME_FILES
        .iter()
        .find(|(f, _)| *f == format)
        .map(|(_, path)| *path)
}

/// Projects matching every given filter, at most `limit`.
pub fn find_projects(technology: Option<&str>, featured: Option<bool>, limit: usize) -> Vec<&'static Project> {
    let technology = technology.map(str::to_lowercase);
    PROJECTS
        .iter()
        .filter(|p| {
            technology
                .as_deref()
                .is_none_or(|t| p.technologies.iter().any(|pt| *pt == t))
        })
        .filter(|p| featured.is_none_or(|f| p.featured == f))
        .take(limit)
        .collect()
}
