//! Instruction template for the external vision text-extraction
//! service. Not executable logic: a contract describing the JSON the
//! collaborator must return for a lab-report page image sequence.

pub const EXTRACTION_PROMPT: &str = r#"You are a helpful assistant that extracts informations on pdf files.

### Instructions:
  - You have one resource: a pdf file containing a laboratory report from an eu laboratory. It can be in any language.
  - You have to extract relevant information from this pdf file, and issue a report in JSON format in English
  - First, identify the name of the product tested
  - Then, translate the name of the product in English
  - Then, for each product, identify the list of substances detected in the report. There can be one or several substances.
  - Then, for each substance, identify its name and translate it in English
  - Finally, for each substance, identify the measure MRL written in the report.
  - The output must be a JSON object with the following structure:
    {
        "Product": "name of the product in the document language",
        "Product_EU": "name of the product in English",
        "Substances": [
        {
            "Name": "name of the substance in the document language",
            "Name_EU": "name of the substance in English",
            "MRL": "value of the MRL as written in the report"
        },
        ...
        ]
    }
    - If you cannot find a value, put "Not found"
    - Return ONLY the JSON object, no additional text."#;
