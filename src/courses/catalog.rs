use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Serialize)]
pub struct Course {
    pub id: u32,
    pub name: &'static str,
    pub description: &'static str,
    pub duration: &'static str,
    pub modules: u32,
    pub difficulty: Difficulty,
    pub icon: &'static str,
    pub color: &'static str,
}

static COURSES: [Course; 3] = [
    Course {
        id: 1,
        name: "AWS Fundamentals",
        description: "Master core AWS services including EC2, S3, VPC, and IAM",
        duration: "40 hours",
        modules: 12,
        difficulty: Difficulty::Beginner,
        icon: "fab fa-aws",
        color: "#ff9900",
    },
    Course {
        id: 2,
        name: "DevOps & CI/CD",
        description: "Build automated deployment pipelines with CodePipeline and Docker",
        duration: "35 hours",
        modules: 10,
        difficulty: Difficulty::Intermediate,
        icon: "fas fa-code-branch",
        color: "#00d4ff",
    },
    Course {
        id: 3,
        name: "Cloud Security",
        description: "Implement security best practices in AWS environments",
        duration: "30 hours",
        modules: 8,
        difficulty: Difficulty::Advanced,
        icon: "fas fa-shield-alt",
        color: "#00ff88",
    },
];

pub fn catalog() -> &'static [Course] {
    &COURSES
}

#[derive(Debug, Serialize)]
pub struct CourseList {
    pub courses: &'static [Course],
    pub total_courses: usize,
}

pub fn course_list() -> CourseList {
    let courses = catalog();
    CourseList {
        courses,
        total_courses: courses.len(),
    }
}
