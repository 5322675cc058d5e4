// src/common/documents.rs

// Validação dos documentos brasileiros (CPF e CNPJ) usada pelos payloads.
// Aceitamos apenas dígitos; a formatação com pontos e traços é responsabilidade do frontend.

use validator::ValidationError;

pub fn validate_cpf(cpf: &str) -> Result<(), ValidationError> {
    if is_valid_cpf(cpf) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_cpf"))
    }
}

pub fn validate_cnpj(cnpj: &str) -> Result<(), ValidationError> {
    if is_valid_cnpj(cnpj) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_cnpj"))
    }
}

/// UF com duas letras maiúsculas ("SP", "RJ").
pub fn validate_uf(uf: &str) -> Result<(), ValidationError> {
    if uf.len() == 2 && uf.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_uf"))
    }
}

fn digits(value: &str, expected_len: usize) -> Option<Vec<u32>> {
    if value.len() != expected_len {
        return None;
    }
    value.chars().map(|c| c.to_digit(10)).collect()
}

fn check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    let rest = sum % 11;
    if rest < 2 { 0 } else { 11 - rest }
}

pub fn is_valid_cpf(cpf: &str) -> bool {
    let Some(d) = digits(cpf, 11) else {
        return false;
    };
    // Sequências repetidas ("111.111.111-11") passam no cálculo mas não são válidas.
    if d.iter().all(|&x| x == d[0]) {
        return false;
    }
    let first = check_digit(&d[..9], &[10, 9, 8, 7, 6, 5, 4, 3, 2]);
    let second = check_digit(&d[..10], &[11, 10, 9, 8, 7, 6, 5, 4, 3, 2]);
    d[9] == first && d[10] == second
}

pub fn is_valid_cnpj(cnpj: &str) -> bool {
    let Some(d) = digits(cnpj, 14) else {
        return false;
    };
    if d.iter().all(|&x| x == d[0]) {
        return false;
    }
    let first = check_digit(&d[..12], &[5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2]);
    let second = check_digit(&d[..13], &[6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2]);
    d[12] == first && d[13] == second
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_cpf() {
        assert!(is_valid_cpf("52998224725"));
        assert!(validate_cpf("11144477735").is_ok());
    }

    #[test]
    fn rejects_bad_cpf() {
        assert!(!is_valid_cpf("52998224724"));
        assert!(!is_valid_cpf("11111111111"));
        assert!(!is_valid_cpf("529.982.247-25"));
        assert!(!is_valid_cpf("123"));
        assert_eq!(validate_cpf("00000000000").unwrap_err().code, "invalid_cpf");
    }

    #[test]
    fn accepts_valid_cnpj() {
        assert!(is_valid_cnpj("11222333000181"));
    }

    #[test]
    fn rejects_bad_cnpj() {
        assert!(!is_valid_cnpj("11222333000182"));
        assert!(!is_valid_cnpj("00000000000000"));
        assert!(!is_valid_cnpj("11.222.333/0001-81"));
    }

    #[test]
    fn uf_must_be_two_uppercase_letters() {
        assert!(validate_uf("SP").is_ok());
        assert!(validate_uf("sp").is_err());
        assert!(validate_uf("SPO").is_err());
    }
}
