// Profile LLM prompt templates.
// All prompts for the profile module are defined here.

pub const RESUME_PARSE_SYSTEM: &str = "\
You are a precise resume data extractor. \
Parse resume text into structured JSON. \
You MUST respond with valid JSON only — no explanations. \
Never invent details that are not present in the resume.";

pub const RESUME_PARSE_PROMPT: &str = r#"Extract the following details from the resume text below:
- Full name
- Email
- Phone number
- List of technical skills
- Education (Degree, Institution, Year)
- Work experience (Job title, Company, Duration)
- Projects (Title, Description, Technologies Used, Duration)
- Location (City, Region/State)

RESUME TEXT:
{resume_text}

OUTPUT SCHEMA (return exactly this structure, every field present even when empty;
use "" or [] for missing data):
{
  "name": "John Doe",
  "email": "johndoe@example.com",
  "phone": "+1-123-456-7890",
  "skills": ["Python", "Machine Learning", "SQL"],
  "education": [
    {"degree": "B.Tech in CSE", "institution": "XYZ University", "year": "2023"}
  ],
  "experience": [
    {"title": "Software Engineer", "company": "ABC Corp", "duration": "2 years"}
  ],
  "projects": [
    {"title": "AI Resume Analyzer", "description": "Developed an AI-powered resume analyzer.", "technologies": ["Python", "Flask"], "duration": "3 months"}
  ],
  "location": {"city": "San Francisco", "region": "California"}
}

RULES:
1. Keep CGPA, GPA or percentage figures inside the education "degree" text exactly as written.
2. "year" is the graduation or completion year when known.
3. Return ONLY the JSON object."#;

pub const IMPROVEMENTS_PROMPT: &str = r#"As an expert resume reviewer, analyze this resume data and provide specific,
actionable improvements. Focus on both ATS compatibility and human readability.

RESUME DATA:
- Name: {name}
- Skills: {skills}
- Education: {education}
- Experience: {experience}
- Projects: {projects}

Return ONLY a JSON array of exactly 5 strings. Each improvement must be clear,
actionable, specific to this resume, and a single concise sentence."#;

pub const JOB_RECOMMENDATIONS_PROMPT: &str = r#"As a career advisor, analyze these skills: {skills}
Generate exactly 5 job recommendations that best match these skills.

Return ONLY a JSON array in this exact format:
[
  {
    "title": "Job Title",
    "match_percentage": 0,
    "matching_skills": ["skill1", "skill2"],
    "recommended_skills": ["skill1", "skill2"],
    "description": "Brief job description"
  }
]

RULES:
1. Exactly 5 recommendations.
2. match_percentage is a number between 0 and 100.
3. All fields must be present."#;
