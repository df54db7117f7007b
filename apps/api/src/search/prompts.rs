pub fn resume_search_prompt(filter_instructions: &str) -> String {
    format!(
        "I am a job seeker with the profile provided in the attached document (resume).\n\n\
         1. First, analyze the resume to identify the most suitable job titles, skills, \
         and industries.\n\
         2. Then, use the Google Search tool to find 5-7 active, real job listings \
         that match this profile.\n\
         {filter_instructions}\n\n\
         For each job, provide the Job Title, Company Name, and a brief snippet of why \
         it's a match based on my resume.\n\
         You MUST use the Google Search tool."
    )
}

pub fn manual_search_prompt(phrase: &str, filter_instructions: &str) -> String {
    format!(
        "Please search for active job listings for: \"{phrase}\".\n\
         {filter_instructions}\n\n\
         Return a list of 5-7 relevant job openings found on the web.\n\
         For each job, provide the Job Title, Company Name, and a brief snippet of why \
         it's a match.\n\
         You MUST use the Google Search tool to find real, current listings."
    )
}
