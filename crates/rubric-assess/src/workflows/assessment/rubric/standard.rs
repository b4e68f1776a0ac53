use super::{Category, Rubric, ScoringCriterion, ScoringScale, Subcategory};
use crate::workflows::assessment::domain::{CategoryId, RubricId, SubcategoryId};

const LABELS: [&str; 5] = ["Poor", "Fair", "Good", "Very Good", "Excellent"];

impl Rubric {
    /// Enterprise application portfolio rubric used for demos and as the default server seed.
    pub fn standard() -> Self {
        Self {
            id: RubricId("rubric-1".to_string()),
            name: "Enterprise Application Assessment v2.1".to_string(),
            version: "2.1".to_string(),
            description: "Comprehensive assessment rubric for enterprise applications".to_string(),
            industry_type: Some("General".to_string()),
            categories: standard_categories(),
            scoring_scale: ScoringScale::default(),
        }
    }
}

fn standard_categories() -> Vec<Category> {
    vec![
        category(
            "cat-security",
            "Security",
            "Application security posture and risk assessment",
            30.0,
            vec![
                subcategory(
                    "sub-sec-1",
                    "Authentication & Authorization",
                    "User authentication mechanisms and access controls",
                    30.0,
                    [
                        "Basic password authentication only",
                        "Password with basic complexity requirements",
                        "Multi-factor authentication available",
                        "MFA enforced with role-based access",
                        "Advanced MFA with zero-trust principles",
                    ],
                ),
                subcategory(
                    "sub-sec-2",
                    "Data Encryption",
                    "Data protection through encryption at rest and in transit",
                    25.0,
                    [
                        "No encryption implemented",
                        "Basic encryption for sensitive data",
                        "Encryption at rest and in transit",
                        "Strong encryption with key management",
                        "Enterprise-grade encryption with HSM",
                    ],
                ),
                subcategory(
                    "sub-sec-3",
                    "Vulnerability Management",
                    "Security vulnerability assessment and remediation processes",
                    25.0,
                    [
                        "No vulnerability scanning",
                        "Annual vulnerability assessments",
                        "Quarterly vulnerability scans",
                        "Monthly scans with remediation tracking",
                        "Continuous monitoring and automated remediation",
                    ],
                ),
                subcategory(
                    "sub-sec-4",
                    "Audit & Compliance",
                    "Security audit trails and regulatory compliance",
                    20.0,
                    [
                        "No audit logging",
                        "Basic access logging",
                        "Comprehensive audit trails",
                        "Audit trails with integrity protection",
                        "Real-time monitoring with SIEM integration",
                    ],
                ),
            ],
        ),
        category(
            "cat-performance",
            "Performance",
            "Application performance, scalability, and availability",
            25.0,
            vec![
                subcategory(
                    "sub-perf-1",
                    "Response Time",
                    "Application response time under normal load",
                    35.0,
                    [
                        ">5 seconds average response time",
                        "3-5 seconds average response time",
                        "1-3 seconds average response time",
                        "0.5-1 second average response time",
                        "<0.5 seconds average response time",
                    ],
                ),
                subcategory(
                    "sub-perf-2",
                    "Scalability",
                    "Ability to handle increased load and user growth",
                    30.0,
                    [
                        "Cannot scale beyond current load",
                        "Limited vertical scaling only",
                        "Horizontal scaling with manual intervention",
                        "Auto-scaling with some limitations",
                        "Elastic auto-scaling across all tiers",
                    ],
                ),
                subcategory(
                    "sub-perf-3",
                    "Availability",
                    "System uptime and availability metrics",
                    35.0,
                    [
                        "<95% uptime",
                        "95-97% uptime",
                        "97-99% uptime",
                        "99-99.5% uptime",
                        ">99.5% uptime with HA architecture",
                    ],
                ),
            ],
        ),
        category(
            "cat-maintainability",
            "Maintainability",
            "Code quality, technical debt, and support capabilities",
            20.0,
            vec![
                subcategory(
                    "sub-maint-1",
                    "Code Quality",
                    "Code maintainability, documentation, and standards compliance",
                    40.0,
                    [
                        "Legacy code with no documentation",
                        "Some documentation, inconsistent standards",
                        "Well-documented with coding standards",
                        "High-quality code with automated testing",
                        "Exemplary code quality with comprehensive testing",
                    ],
                ),
                subcategory(
                    "sub-maint-2",
                    "Technical Debt",
                    "Level of technical debt and modernization needs",
                    35.0,
                    [
                        "Significant technical debt, major refactoring needed",
                        "Moderate technical debt, some refactoring needed",
                        "Manageable technical debt",
                        "Minimal technical debt",
                        "Modern architecture with no significant debt",
                    ],
                ),
                subcategory(
                    "sub-maint-3",
                    "Support & Documentation",
                    "Quality of support documentation and knowledge transfer",
                    25.0,
                    [
                        "No documentation or support materials",
                        "Basic documentation, limited support",
                        "Good documentation and support processes",
                        "Comprehensive documentation and training",
                        "Excellent documentation with self-service capabilities",
                    ],
                ),
            ],
        ),
        category(
            "cat-business-value",
            "Business Value",
            "Business alignment and value delivery",
            15.0,
            vec![
                subcategory(
                    "sub-bv-1",
                    "Strategic Alignment",
                    "Alignment with business strategy and objectives",
                    50.0,
                    [
                        "No clear business alignment",
                        "Limited business value",
                        "Good business alignment",
                        "Strong strategic value",
                        "Critical to business strategy",
                    ],
                ),
                subcategory(
                    "sub-bv-2",
                    "User Satisfaction",
                    "End user satisfaction and adoption rates",
                    50.0,
                    [
                        "Low user satisfaction, high complaints",
                        "Below average user satisfaction",
                        "Average user satisfaction",
                        "High user satisfaction",
                        "Exceptional user satisfaction and adoption",
                    ],
                ),
            ],
        ),
        category(
            "cat-compliance",
            "Compliance",
            "Regulatory compliance and governance",
            10.0,
            vec![
                subcategory(
                    "sub-comp-1",
                    "Regulatory Compliance",
                    "Adherence to industry regulations and standards",
                    60.0,
                    [
                        "Non-compliant with major regulations",
                        "Partially compliant, gaps identified",
                        "Mostly compliant with minor gaps",
                        "Fully compliant with regular audits",
                        "Exceeds compliance requirements",
                    ],
                ),
                subcategory(
                    "sub-comp-2",
                    "Data Governance",
                    "Data privacy, retention, and governance policies",
                    40.0,
                    [
                        "No data governance policies",
                        "Basic data governance",
                        "Good data governance practices",
                        "Comprehensive data governance",
                        "Industry-leading data governance",
                    ],
                ),
            ],
        ),
    ]
}

fn category(
    id: &str,
    name: &str,
    description: &str,
    weight: f64,
    subcategories: Vec<Subcategory>,
) -> Category {
    Category {
        id: CategoryId(id.to_string()),
        name: name.to_string(),
        description: description.to_string(),
        weight,
        subcategories,
    }
}

/// Five-point subcategory; `levels` describes scores 1 through 5 in order.
fn subcategory(
    id: &str,
    name: &str,
    description: &str,
    weight: f64,
    levels: [&str; 5],
) -> Subcategory {
    let scoring_criteria = LABELS
        .iter()
        .zip(levels)
        .zip(1u8..)
        .map(|((label, description), score)| ScoringCriterion {
            score,
            label: label.to_string(),
            description: description.to_string(),
        })
        .collect();

    Subcategory {
        id: SubcategoryId(id.to_string()),
        name: name.to_string(),
        description: description.to_string(),
        weight,
        scoring_criteria,
    }
}
